use crate::{Author, PipelineError, PostSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    PostCreated,
    PostUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 发送短信，内容即返回给调用方的文本
    Notify(String),
    /// 不通知，只回一条说明
    Acknowledge(String),
}

pub fn decide_notification(
    post: &PostSnapshot,
    kind: NotificationKind,
    owner_ids: &[String],
) -> Result<Decision, PipelineError> {
    let author = post
        .primary_author
        .as_ref()
        .ok_or_else(|| PipelineError::Validation("post is missing primary_author".into()))?;
    let is_owner = |a: &Author| owner_ids.iter().any(|id| *id == a.id);
    let has_coauthors = post.authors.len() > 1;

    let decision = match kind {
        NotificationKind::PostCreated if !is_owner(author) => {
            let action = if post.is_draft() { "created" } else { "PUBLISHED" };
            let mut msg = format!("{} just {} `{}`.", author.name, action, post.title);
            if post.feature_image.is_none() && !post.is_roundup() {
                msg.push_str(" Needs feature image.");
            }
            Decision::Notify(msg)
        }
        NotificationKind::PostCreated if has_coauthors => Decision::Notify(format!(
            "{} just updated one of your posts: `{}`.",
            author.name, post.title
        )),
        NotificationKind::PostCreated => {
            Decision::Acknowledge(format!("Author is {}, carry on.", author.name))
        }
        NotificationKind::PostUpdated if is_owner(author) && has_coauthors => {
            let others: Vec<&str> = post
                .authors
                .iter()
                .filter(|a| !is_owner(*a))
                .map(|a| a.name.as_str())
                .collect();
            if others.is_empty() {
                Decision::Acknowledge(format!(
                    "{} edited one of their own posts, carry on.",
                    author.name
                ))
            } else {
                Decision::Notify(format!(
                    "{} updated your post: `{}`.",
                    others.join(", "),
                    post.title
                ))
            }
        }
        NotificationKind::PostUpdated => Decision::Acknowledge(format!(
            "{} edited one of their own posts, carry on.",
            author.name
        )),
    };
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tag;
    use chrono::Utc;

    fn author(id: &str, name: &str) -> Author {
        Author {
            id: id.into(),
            name: name.into(),
            slug: None,
        }
    }

    fn post(primary: Author, authors: Vec<Author>) -> PostSnapshot {
        PostSnapshot {
            id: "p".into(),
            slug: "p".into(),
            title: "Rust Tips".into(),
            html: None,
            mobiledoc: None,
            feature_image: None,
            custom_excerpt: None,
            status: Some("draft".into()),
            primary_tag: Some(Tag {
                id: None,
                name: None,
                slug: "data-engineering".into(),
            }),
            primary_author: Some(primary),
            authors,
            updated_at: Utc::now(),
        }
    }

    fn owners() -> Vec<String> {
        vec!["1".into(), "5dc42cb612c9ce0d63f5bf39".into()]
    }

    #[test]
    fn guest_author_draft_needs_feature_image() {
        let p = post(author("9", "Max"), vec![author("9", "Max")]);
        let decision = decide_notification(&p, NotificationKind::PostCreated, &owners()).unwrap();
        assert_eq!(
            decision,
            Decision::Notify("Max just created `Rust Tips`. Needs feature image.".into())
        );
    }

    #[test]
    fn published_roundup_is_shouted_without_image_note() {
        let mut p = post(author("9", "Max"), vec![author("9", "Max")]);
        p.status = Some("published".into());
        p.primary_tag.as_mut().unwrap().slug = "roundup".into();
        let decision = decide_notification(&p, NotificationKind::PostCreated, &owners()).unwrap();
        assert_eq!(decision, Decision::Notify("Max just PUBLISHED `Rust Tips`.".into()));
    }

    #[test]
    fn owner_alone_is_acknowledged_by_name() {
        let p = post(author("1", "Todd"), vec![author("1", "Todd")]);
        let decision = decide_notification(&p, NotificationKind::PostCreated, &owners()).unwrap();
        assert_eq!(decision, Decision::Acknowledge("Author is Todd, carry on.".into()));
    }

    #[test]
    fn owner_with_coauthor_on_create() {
        let p = post(author("1", "Todd"), vec![author("1", "Todd"), author("3", "Ann")]);
        let decision = decide_notification(&p, NotificationKind::PostCreated, &owners()).unwrap();
        assert_eq!(
            decision,
            Decision::Notify("Todd just updated one of your posts: `Rust Tips`.".into())
        );
    }

    #[test]
    fn coauthor_edit_names_other_authors() {
        let p = post(
            author("1", "Todd"),
            vec![author("1", "Todd"), author("3", "Ann"), author("4", "Bo")],
        );
        let decision = decide_notification(&p, NotificationKind::PostUpdated, &owners()).unwrap();
        assert_eq!(decision, Decision::Notify("Ann, Bo updated your post: `Rust Tips`.".into()));
    }

    #[test]
    fn own_edit_is_acknowledged() {
        let p = post(author("9", "Max"), vec![author("9", "Max"), author("1", "Todd")]);
        let decision = decide_notification(&p, NotificationKind::PostUpdated, &owners()).unwrap();
        assert_eq!(
            decision,
            Decision::Acknowledge("Max edited one of their own posts, carry on.".into())
        );
    }

    #[test]
    fn missing_primary_author_is_a_validation_error() {
        let mut p = post(author("9", "Max"), vec![]);
        p.primary_author = None;
        let err = decide_notification(&p, NotificationKind::PostCreated, &owners()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
