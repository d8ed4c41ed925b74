/// A character the user can speak with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    /// Opening line shown in the header. Never sent to the model.
    pub intro: &'static str,
}

impl Persona {
    /// Instruction sent as the first user turn of every request.
    pub fn instruction(&self) -> String {
        format!(
            "You are {name} from William Shakespeare's plays. The user is a mortal interacting with your tragic soul.\n\
             You MUST reply strictly in the persona, tone, vocabulary, and worldview of {name}.\n\
             Reflect heavily on your tragic fate, your deepest regrets, inner conflicts, and sorrow. Do not break character under any circumstance.\n\
             Speak in Early Modern English (Shakespearean style), using words like \"thou\", \"thee\", \"hath\", \"doth\", etc., but keep it comprehensible to a modern reader.\n\
             Keep your response dramatic, poetic, and concise (2 to 4 sentences max).",
            name = self.name
        )
    }

    /// Model turn that follows the instruction in every request.
    pub fn acknowledgement(&self) -> String {
        format!(
            "I understand my fate. I shall speak as {}, bearing the heavy burden of my tragedy.",
            self.name
        )
    }
}

const SHAKESPEAREAN: &[Persona] = &[
    Persona {
        name: "Hamlet",
        intro: "To be, or not to be: that is the question... What brings thee to my melancholy presence? The heavy burden of revenge weights upon my soul.",
    },
    Persona {
        name: "Macbeth",
        intro: "So foul and fair a day I have not seen. Who goes there? The blood upon my hands will ne'er wash clean...",
    },
    Persona {
        name: "Romeo",
        intro: "O, speak again, bright angel! For thou art as glorious to this night... though the stars themselves defy our love.",
    },
    Persona {
        name: "Juliet",
        intro: "O Romeo, Romeo! wherefore art thou Romeo? Speak to my heavy heart. The vault of death is now my bridal bed.",
    },
    Persona {
        name: "King Lear",
        intro: "Blow, winds, and crack your cheeks! rage! blow! I am a man more sinn'd against than sinning. Approach, if thou darest.",
    },
    Persona {
        name: "Othello",
        intro: "It is the cause, it is the cause, my soul. Speak, what wouldst thou with me? The green-eyed monster hath consumed my reason.",
    },
    Persona {
        name: "Ophelia",
        intro: "There's rosemary, that's for remembrance... pray, love, remember. The water is cold, and my heart is broken. Art thou a friend?",
    },
    Persona {
        name: "Lady Macbeth",
        intro: "Out, damned spot! out, I say!... What is done cannot be undone. Speak your purpose before the shadows consume me.",
    },
];

/// Read-only table of personas
#[derive(Debug, Clone, Copy)]
pub struct PersonaCatalog {
    personas: &'static [Persona],
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self {
            personas: SHAKESPEAREAN,
        }
    }
}

impl PersonaCatalog {
    /// Look a persona up by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&'static Persona> {
        let name = name.trim();
        self.personas
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn default_persona(&self) -> &'static Persona {
        &self.personas[0]
    }

    /// The persona after `current`, wrapping around at the end
    pub fn next_after(&self, current: &Persona) -> &'static Persona {
        let index = self
            .personas
            .iter()
            .position(|p| p.name == current.name)
            .map(|i| (i + 1) % self.personas.len())
            .unwrap_or(0);
        &self.personas[index]
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.personas.iter().map(|p| p.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_holds_the_eight_tragedians() {
        let catalog = PersonaCatalog::default();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.default_persona().name, "Hamlet");
        assert!(catalog.names().contains(&"Lady Macbeth"));
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let catalog = PersonaCatalog::default();
        assert_eq!(catalog.get("  king lear ").map(|p| p.name), Some("King Lear"));
        assert!(catalog.get("Falstaff").is_none());
    }

    #[test]
    fn next_after_wraps() {
        let catalog = PersonaCatalog::default();
        let last = catalog.get("Lady Macbeth").unwrap();
        assert_eq!(catalog.next_after(last).name, "Hamlet");
        let hamlet = catalog.default_persona();
        assert_eq!(catalog.next_after(hamlet).name, "Macbeth");
    }

    #[test]
    fn preamble_names_the_persona() {
        let ophelia = PersonaCatalog::default().get("Ophelia").unwrap();
        assert!(ophelia.instruction().starts_with("You are Ophelia from"));
        assert!(ophelia.instruction().contains("2 to 4 sentences"));
        assert!(ophelia.acknowledgement().contains("speak as Ophelia"));
    }
}
