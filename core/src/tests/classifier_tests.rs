use crate::command::{classify, Command};
use crate::tools::ToolKind;

#[test]
fn test_password_wins_over_every_later_rule() {
    let cmd = classify("check password security news surveillance").unwrap();
    assert_eq!(
        cmd,
        Command::CheckPassword {
            secret: "security news surveillance".to_string()
        }
    );
}

#[test]
fn test_email_argument_is_trimmed() {
    let cmd = classify("Check Email   someone@example.com  ").unwrap();
    assert_eq!(
        cmd,
        Command::CheckEmail {
            address: "someone@example.com".to_string()
        }
    );
}

#[test]
fn test_news_prefixes() {
    assert_eq!(classify("security news").unwrap(), Command::SecurityNews);
    assert_eq!(classify("Hacker News please").unwrap(), Command::SecurityNews);
    // prefix only, not substring
    assert_eq!(
        classify("any hacker news?").unwrap(),
        Command::Chat {
            message: "any hacker news?".to_string()
        }
    );
}

#[test]
fn test_surveillance_matches_anywhere_including_misspelling() {
    assert_eq!(classify("show me SURVEILLANCE cams").unwrap(), Command::Surveillance);
    assert_eq!(classify("survelliance").unwrap(), Command::Surveillance);
    // rule 4 is checked before search
    assert_eq!(classify("search surveillance feeds").unwrap(), Command::Surveillance);
}

#[test]
fn test_search_query() {
    assert_eq!(
        classify("SEARCH Jane Doe").unwrap(),
        Command::Search {
            query: "Jane Doe".to_string()
        }
    );
}

#[test]
fn test_usage_errors() {
    let err = classify("check password").unwrap_err();
    assert_eq!(err.tool, ToolKind::Password);
    assert_eq!(err.to_string(), "Usage: check password yourpassword");

    let err = classify("check email    ").unwrap_err();
    assert_eq!(err.to_string(), "Usage: check email your_email@example.com");

    // only reachable with an untrimmed line
    let err = classify("search   ").unwrap_err();
    assert_eq!(err.tool, ToolKind::Osint);
    assert_eq!(err.to_string(), "Usage: search <name or handle>");
}

#[test]
fn test_fallback_is_verbatim() {
    let line = "How do I spot a Phishing email?";
    assert_eq!(
        classify(line).unwrap(),
        Command::Chat {
            message: line.to_string()
        }
    );
}

#[test]
fn test_non_ascii_input_does_not_panic() {
    assert!(matches!(classify("ché").unwrap(), Command::Chat { .. }));
    assert!(matches!(classify("check passwör").unwrap(), Command::Chat { .. }));
}
