//! The instructions that put the model in character.

use crate::profile::Profile;

const INSTRUCTIONS: &str = include_str!("./system_prompt.md");

/// Builds the system prompt for `name`, embedding the profile texts
/// verbatim.
pub fn system_prompt(name: &str, profile: &Profile) -> String {
    let mut prompt = INSTRUCTIONS.trim_end().replace("{{NAME}}", name);
    prompt.push_str(&format!(
        "\n\n## Summary:\n{}\n\n## LinkedIn Profile:\n{}\n\n## Resume:\n{}\n\n",
        profile.summary, profile.profile_text, profile.resume_text
    ));
    prompt.push_str(&format!(
        "With this context, please chat with the user, always staying in \
         character as {name}."
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt() {
        let profile = Profile {
            summary: "I write {{NAME}} templates.".to_owned(),
            profile_text: "Staff engineer".to_owned(),
            resume_text: String::new(),
        };
        let prompt = system_prompt("Ada Lovelace", &profile);

        assert!(prompt.starts_with("You are acting as Ada Lovelace."));
        assert!(!prompt[..prompt.find("## Summary").unwrap()].contains("{{NAME}}"));
        assert!(prompt.contains("do not share my mobile number"));
        assert!(prompt.contains("record_unknown_question"));
        assert!(prompt.contains("record_user_details"));
        assert!(prompt.contains("## Summary:\nI write {{NAME}} templates.\n"));
        assert!(prompt.contains("## LinkedIn Profile:\nStaff engineer\n"));
        assert!(prompt.contains("## Resume:\n\n"));
        assert!(prompt.ends_with("always staying in character as Ada Lovelace."));
    }
}
