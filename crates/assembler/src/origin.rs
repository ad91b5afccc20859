//! Origin annotation - repost prefix derivation

use contracts::{InboundEvent, Origin};

const UNKNOWN_CHANNEL: &str = "Unknown Channel";
const UNKNOWN_USER: &str = "Unknown User";

/// Derive the repost prefix for an event, if it has origin metadata.
///
/// With a permalink/profile link the prefix carries a markdown link to the
/// original; otherwise it is plain text. Missing names fall back to
/// "Unknown Channel" / "Unknown User".
pub fn origin_prefix(event: &InboundEvent, template: &str) -> Option<String> {
    let origin = event.origin.as_ref()?;
    let prefix = match origin {
        Origin::Channel { title, permalink } => {
            let name = title.as_deref().unwrap_or(UNKNOWN_CHANNEL);
            match permalink {
                Some(link) => format!("{template}[{name}]({link})"),
                None => format!("{template}{name}"),
            }
        }
        Origin::User {
            first_name,
            profile_link,
        } => {
            let name = first_name.as_deref().unwrap_or(UNKNOWN_USER);
            match profile_link {
                Some(link) => format!("{template}[{name}]({link})"),
                None => format!("{template}{name}"),
            }
        }
    };
    Some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_origin(origin: Option<Origin>) -> InboundEvent {
        InboundEvent {
            event_id: 1,
            group_key: None,
            text: None,
            attachments: vec![],
            origin,
        }
    }

    #[test]
    fn test_no_origin_no_prefix() {
        let event = event_with_origin(None);
        assert_eq!(origin_prefix(&event, "Forwarded from "), None);
    }

    #[test]
    fn test_public_channel_links_to_post() {
        let event = event_with_origin(Some(Origin::Channel {
            title: Some("News".to_string()),
            permalink: Some("https://t.me/news/42".to_string()),
        }));
        assert_eq!(
            origin_prefix(&event, "Forwarded from ").as_deref(),
            Some("Forwarded from [News](https://t.me/news/42)")
        );
    }

    #[test]
    fn test_private_channel_plain_name() {
        let event = event_with_origin(Some(Origin::Channel {
            title: Some("Secret".to_string()),
            permalink: None,
        }));
        assert_eq!(
            origin_prefix(&event, "Forwarded from ").as_deref(),
            Some("Forwarded from Secret")
        );
    }

    #[test]
    fn test_channel_name_fallback() {
        let event = event_with_origin(Some(Origin::Channel {
            title: None,
            permalink: None,
        }));
        assert_eq!(
            origin_prefix(&event, "Forwarded from ").as_deref(),
            Some("Forwarded from Unknown Channel")
        );
    }

    #[test]
    fn test_user_with_profile_link() {
        let event = event_with_origin(Some(Origin::User {
            first_name: Some("Alice".to_string()),
            profile_link: Some("https://t.me/alice".to_string()),
        }));
        assert_eq!(
            origin_prefix(&event, "Forwarded from ").as_deref(),
            Some("Forwarded from [Alice](https://t.me/alice)")
        );
    }

    #[test]
    fn test_user_name_fallback() {
        let event = event_with_origin(Some(Origin::User {
            first_name: None,
            profile_link: None,
        }));
        assert_eq!(
            origin_prefix(&event, "Forwarded from ").as_deref(),
            Some("Forwarded from Unknown User")
        );
    }
}
