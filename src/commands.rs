use anyhow::{bail, Result};
use crate::error::ChatError;
use crate::events::MessageOrigin;
use crate::persona::PersonaCatalog;
use crate::ui::conversation::ConversationController;

pub fn list_personas(catalog: &PersonaCatalog) {
    println!("🎭 The company of players:");
    println!("{}", "=".repeat(50));

    for persona in catalog.iter() {
        println!("📜 {}", persona.name);
        println!("   {}", persona.intro);
        println!();
    }

    println!("Run 'tragedian --persona \"<name>\"' to begin a conversation.");
}

/// Send a single line to the selected persona and print the answer
pub async fn ask(mut controller: ConversationController, text: &str) -> Result<()> {
    let persona = controller.session().persona();

    if text.trim().is_empty() {
        println!("🤫 {} awaits thy words. Say something first.", persona.name);
        return Ok(());
    }

    if let Err(err) = controller.submit_user_turn(text) {
        if err == ChatError::MissingCredential {
            bail!("No API key. Pass --api-key or set GEMINI_API_KEY.");
        }
        return Err(err.into());
    }
    controller.wait_for_completion().await;

    match controller.messages().last() {
        Some(message) => match &message.origin {
            MessageOrigin::Character(name) => {
                println!("🎭 {}:", name);
                for line in message.text.lines() {
                    println!("   {}", line);
                }
                Ok(())
            }
            _ => bail!("{}", message.text),
        },
        None => bail!("No reply from {}", persona.name),
    }
}
