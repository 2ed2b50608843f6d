/// Authorization policy for boards, tasks, and comments
///
/// This module is the one piece of real business logic in the system: a
/// pure decision function over explicit ownership/membership data. It has
/// no database or framework dependency, so every rule is testable in
/// isolation; handlers load a [`BoardAccess`] snapshot from the database
/// and evaluate the policy fresh on each request.
///
/// # Permission Model
///
/// 1. **Membership**: the subject must be a member of the relevant board
///    to see anything at all. The board owner is always a member.
/// 2. **Ownership**: deleting a board is reserved for its owner.
/// 3. **Authorship**: deleting a comment is reserved for its author.
///
/// # Visibility
///
/// A subject with no membership on the relevant board gets
/// [`Decision::NotFound`], never [`Decision::Forbidden`], so resource
/// existence is not leaked to outsiders. `Forbidden` is only returned
/// when the subject can see the resource but the action is disallowed.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::policy::{board_decision, BoardAccess, BoardAction, Decision};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let member = Uuid::new_v4();
/// let outsider = Uuid::new_v4();
/// let board = BoardAccess::new(owner, vec![owner, member]);
///
/// assert_eq!(board_decision(member, &board, BoardAction::Read), Decision::Allow);
/// assert_eq!(board_decision(member, &board, BoardAction::Delete), Decision::Forbidden);
/// assert_eq!(board_decision(outsider, &board, BoardAction::Read), Decision::NotFound);
/// ```
use std::collections::HashSet;

use uuid::Uuid;

/// Outcome of a policy evaluation
///
/// A denial is final for the request; there is no caching and no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Action is allowed
    Allow,

    /// Subject can see the resource but the action is disallowed (403)
    Forbidden,

    /// Subject has no visibility on the resource (404)
    NotFound,
}

impl Decision {
    /// Converts the decision into a `Result` for use with `?` in handlers
    pub fn check(self) -> Result<(), PolicyError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Forbidden => Err(PolicyError::Forbidden),
            Decision::NotFound => Err(PolicyError::NotFound),
        }
    }
}

/// Error form of a denied [`Decision`]
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Subject is visible but the action is disallowed
    #[error("Not authorized to perform this action")]
    Forbidden,

    /// Subject has no visibility on the resource
    #[error("Resource not found")]
    NotFound,
}

/// Ownership and membership snapshot of a single board
///
/// Loaded from the database per request. Tasks and comments resolve to
/// the access data of their owning board.
#[derive(Debug, Clone)]
pub struct BoardAccess {
    /// The board's owner
    pub owner_id: Uuid,

    /// All member user ids (owner included by construction)
    pub members: HashSet<Uuid>,
}

impl BoardAccess {
    /// Creates an access snapshot from owner and member ids
    pub fn new(owner_id: Uuid, members: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            owner_id,
            members: members.into_iter().collect(),
        }
    }

    /// Checks whether a user owns this board
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Checks whether a user is a member of this board
    ///
    /// The owner is implicitly a member even if the membership row is
    /// somehow missing.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.is_owner(user_id) || self.members.contains(&user_id)
    }
}

/// Actions a subject can take on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// View the board, its members, and its tasks
    Read,

    /// Change the title or the member set
    Update,

    /// Delete the board (owner only)
    Delete,
}

/// Actions a subject can take on a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// View the task
    Read,

    /// Create a task on the board
    Create,

    /// Change task fields
    Update,

    /// Delete the task
    Delete,
}

/// Actions a subject can take on a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// List or view comments on a task
    Read,

    /// Add a comment to a task
    Create,

    /// Delete a comment (author only)
    Delete,
}

/// Decides whether `subject` may perform `action` on a board
///
/// | Action | Rule |
/// |--------|------|
/// | Read   | member |
/// | Update | member |
/// | Delete | owner |
pub fn board_decision(subject: Uuid, board: &BoardAccess, action: BoardAction) -> Decision {
    if !board.is_member(subject) {
        return Decision::NotFound;
    }

    match action {
        BoardAction::Read | BoardAction::Update => Decision::Allow,
        BoardAction::Delete => {
            if board.is_owner(subject) {
                Decision::Allow
            } else {
                Decision::Forbidden
            }
        }
    }
}

/// Decides whether `subject` may perform `action` on a task of `board`
///
/// All task actions, deletion included, require board membership and
/// nothing more.
pub fn task_decision(subject: Uuid, board: &BoardAccess, _action: TaskAction) -> Decision {
    if board.is_member(subject) {
        Decision::Allow
    } else {
        Decision::NotFound
    }
}

/// Decides whether `subject` may perform `action` on a comment
///
/// `board` is the access snapshot of the comment's task's board and
/// `author_id` is the comment's author. Reading and creating require
/// membership; deleting is reserved for the author.
pub fn comment_decision(
    subject: Uuid,
    board: &BoardAccess,
    author_id: Uuid,
    action: CommentAction,
) -> Decision {
    if !board.is_member(subject) {
        return Decision::NotFound;
    }

    match action {
        CommentAction::Read | CommentAction::Create => Decision::Allow,
        CommentAction::Delete => {
            if subject == author_id {
                Decision::Allow
            } else {
                Decision::Forbidden
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(owner: Uuid, members: &[Uuid]) -> BoardAccess {
        let mut all = members.to_vec();
        all.push(owner);
        BoardAccess::new(owner, all)
    }

    #[test]
    fn test_owner_is_implicitly_member() {
        let owner = Uuid::new_v4();
        // Membership set deliberately missing the owner row
        let board = BoardAccess::new(owner, vec![]);

        assert!(board.is_member(owner));
        assert_eq!(board_decision(owner, &board, BoardAction::Read), Decision::Allow);
    }

    #[test]
    fn test_member_can_read_and_update_board() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let board = board_with(owner, &[member]);

        assert_eq!(board_decision(member, &board, BoardAction::Read), Decision::Allow);
        assert_eq!(board_decision(member, &board, BoardAction::Update), Decision::Allow);
    }

    #[test]
    fn test_only_owner_can_delete_board() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let board = board_with(owner, &[member]);

        assert_eq!(board_decision(owner, &board, BoardAction::Delete), Decision::Allow);
        assert_eq!(
            board_decision(member, &board, BoardAction::Delete),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_non_member_gets_not_found_never_forbidden() {
        let owner = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let board = board_with(owner, &[]);

        for action in [BoardAction::Read, BoardAction::Update, BoardAction::Delete] {
            assert_eq!(board_decision(outsider, &board, action), Decision::NotFound);
        }
        for action in [
            TaskAction::Read,
            TaskAction::Create,
            TaskAction::Update,
            TaskAction::Delete,
        ] {
            assert_eq!(task_decision(outsider, &board, action), Decision::NotFound);
        }
        for action in [CommentAction::Read, CommentAction::Create, CommentAction::Delete] {
            assert_eq!(
                comment_decision(outsider, &board, owner, action),
                Decision::NotFound
            );
        }
    }

    #[test]
    fn test_member_has_full_task_access() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let board = board_with(owner, &[member]);

        for action in [
            TaskAction::Read,
            TaskAction::Create,
            TaskAction::Update,
            TaskAction::Delete,
        ] {
            assert_eq!(task_decision(member, &board, action), Decision::Allow);
        }
    }

    #[test]
    fn test_comment_delete_is_author_only() {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let board = board_with(owner, &[author, other]);

        assert_eq!(
            comment_decision(author, &board, author, CommentAction::Delete),
            Decision::Allow
        );
        assert_eq!(
            comment_decision(other, &board, author, CommentAction::Delete),
            Decision::Forbidden
        );
        // The board owner gets no special treatment on comments
        assert_eq!(
            comment_decision(owner, &board, author, CommentAction::Delete),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_member_can_read_and_create_comments() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let author = Uuid::new_v4();
        let board = board_with(owner, &[member, author]);

        assert_eq!(
            comment_decision(member, &board, author, CommentAction::Read),
            Decision::Allow
        );
        assert_eq!(
            comment_decision(member, &board, author, CommentAction::Create),
            Decision::Allow
        );
    }

    #[test]
    fn test_decision_check() {
        assert!(Decision::Allow.check().is_ok());
        assert!(matches!(
            Decision::Forbidden.check(),
            Err(PolicyError::Forbidden)
        ));
        assert!(matches!(
            Decision::NotFound.check(),
            Err(PolicyError::NotFound)
        ));
    }

    #[test]
    fn test_policy_error_display() {
        assert!(PolicyError::Forbidden.to_string().contains("Not authorized"));
        assert!(PolicyError::NotFound.to_string().contains("not found"));
    }
}
