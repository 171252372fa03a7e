//! Mutations for the poll store (each holds the write lock for the whole operation)

use crate::error::PollError;
use crate::types::{Comment, NewPoll, Poll};

use super::PollStore;

/// Create a poll with a zeroed tally
pub fn create_poll(store: &PollStore, new_poll: NewPoll) -> Result<Poll, PollError> {
    let title = new_poll.title.trim().to_string();
    if title.is_empty() {
        return Err(PollError::Invalid("Poll title must not be empty".to_string()));
    }
    if new_poll.options.is_empty() {
        return Err(PollError::Invalid("Poll needs at least one option".to_string()));
    }

    let mut data = store.data.write();
    data.last_poll_id += 1;
    let poll = Poll::new(data.last_poll_id, title, new_poll.options);
    data.polls.push(poll.clone());
    Ok(poll)
}

/// Record one vote and return the updated tally
pub fn vote(store: &PollStore, poll_id: i64, option_index: usize) -> Result<Vec<i64>, PollError> {
    let mut data = store.data.write();
    let poll = data
        .polls
        .iter_mut()
        .find(|p| p.id == poll_id)
        .ok_or(PollError::PollNotFound(poll_id))?;

    let options = poll.votes.len();
    let counter = poll
        .votes
        .get_mut(option_index)
        .ok_or(PollError::OptionOutOfRange {
            poll_id,
            index: option_index,
            options,
        })?;
    *counter += 1;

    Ok(poll.votes.clone())
}

/// Increment a poll's like count and return the new value
pub fn like_poll(store: &PollStore, poll_id: i64) -> Result<i64, PollError> {
    let mut data = store.data.write();
    let poll = data
        .polls
        .iter_mut()
        .find(|p| p.id == poll_id)
        .ok_or(PollError::PollNotFound(poll_id))?;

    poll.likes += 1;
    Ok(poll.likes)
}

/// Attach a comment to an existing poll
pub fn add_comment(store: &PollStore, poll_id: i64, text: String) -> Result<Comment, PollError> {
    let mut data = store.data.write();
    if !data.polls.iter().any(|p| p.id == poll_id) {
        return Err(PollError::PollNotFound(poll_id));
    }

    data.last_comment_id += 1;
    let comment = Comment::new(data.last_comment_id, poll_id, text);
    data.comments.push(comment.clone());
    Ok(comment)
}

/// Increment a comment's like count and return the updated comment
pub fn like_comment(store: &PollStore, comment_id: i64) -> Result<Comment, PollError> {
    let mut data = store.data.write();
    let comment = data
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(PollError::CommentNotFound(comment_id))?;

    comment.likes += 1;
    Ok(comment.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_poll(title: &str, options: &[&str]) -> NewPoll {
        NewPoll {
            title: title.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_poll_zeroes_votes() {
        let store = PollStore::new();
        let poll = store.create_poll(new_poll("Best editor", &["vim", "emacs", "nano"])).unwrap();

        assert_eq!(poll.id, 1);
        assert_eq!(poll.votes, vec![0, 0, 0]);
        assert_eq!(poll.likes, 0);
    }

    #[test]
    fn test_create_poll_validation() {
        let store = PollStore::new();
        assert!(matches!(
            store.create_poll(new_poll("   ", &["a"])),
            Err(PollError::Invalid(_))
        ));
        assert!(matches!(
            store.create_poll(new_poll("Empty", &[])),
            Err(PollError::Invalid(_))
        ));
    }

    #[test]
    fn test_vote_updates_tally() {
        let store = PollStore::new();
        let poll = store.create_poll(new_poll("Tabs?", &["tabs", "spaces"])).unwrap();

        store.vote(poll.id, 0).unwrap();
        store.vote(poll.id, 0).unwrap();
        store.vote(poll.id, 0).unwrap();
        let votes = store.vote(poll.id, 1).unwrap();

        assert_eq!(votes, vec![3, 1]);
    }

    #[test]
    fn test_vote_errors() {
        let store = PollStore::new();
        let poll = store.create_poll(new_poll("Tabs?", &["tabs", "spaces"])).unwrap();

        assert_eq!(store.vote(99, 0), Err(PollError::PollNotFound(99)));
        assert_eq!(
            store.vote(poll.id, 2),
            Err(PollError::OptionOutOfRange {
                poll_id: poll.id,
                index: 2,
                options: 2
            })
        );
    }

    #[test]
    fn test_likes() {
        let store = PollStore::new();
        let poll = store.create_poll(new_poll("Cats", &["yes"])).unwrap();

        assert_eq!(store.like_poll(poll.id).unwrap(), 1);
        assert_eq!(store.like_poll(poll.id).unwrap(), 2);
        assert_eq!(store.like_poll(7), Err(PollError::PollNotFound(7)));
    }

    #[test]
    fn test_comments() {
        let store = PollStore::new();
        let poll = store.create_poll(new_poll("Cats", &["yes"])).unwrap();

        let comment = store.add_comment(poll.id, "meow".to_string()).unwrap();
        assert_eq!(comment.poll_id, poll.id);
        assert_eq!(comment.likes, 0);

        let liked = store.like_comment(comment.id).unwrap();
        assert_eq!(liked.likes, 1);

        assert_eq!(
            store.add_comment(42, "lost".to_string()),
            Err(PollError::PollNotFound(42))
        );
        assert_eq!(store.like_comment(42), Err(PollError::CommentNotFound(42)));
    }
}
