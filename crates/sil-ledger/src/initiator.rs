use sil_domain::{Directory, RelationResolver};
use sil_types::Role;

/// The ambient caller context of a domain write, passed explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// The authenticated actor, if any.
    pub actor_id: Option<i64>,
}

impl CallerContext {
    pub fn authenticated(actor_id: i64) -> Self {
        Self {
            actor_id: Some(actor_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Where a record hangs in the teaching structure, for fallback
/// attribution when no actor is authenticated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Provenance {
    /// Attendance and grade entries belong to a class subject.
    pub class_subject_id: Option<i64>,
    /// Certificates are issued by a teacher directly.
    pub teacher_id: Option<i64>,
}

impl Provenance {
    pub fn class_subject(id: i64) -> Self {
        Self {
            class_subject_id: Some(id),
            teacher_id: None,
        }
    }

    pub fn teacher(id: i64) -> Self {
        Self {
            class_subject_id: None,
            teacher_id: Some(id),
        }
    }
}

/// Resolves which actor a ledger transaction is attributed to.
///
/// Fixed-order fallback chain, stopping at the first success:
/// 1. the authenticated actor from the caller context;
/// 2. the actor behind the record's owning teacher/class relation;
/// 3. the first actor holding the admin role.
///
/// When all three fail the transaction is simply not created; resolution
/// failure is not an error.
pub struct InitiatorResolver<'a> {
    directory: &'a dyn Directory,
}

impl<'a> InitiatorResolver<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self { directory }
    }

    pub fn resolve(
        &self,
        context: &CallerContext,
        provenance: &Provenance,
        relations: &mut RelationResolver<'_>,
    ) -> Option<i64> {
        if let Some(actor_id) = context.actor_id {
            return Some(actor_id);
        }

        if let Some(class_subject_id) = provenance.class_subject_id {
            if let Some(actor_id) = relations.class_teacher_actor_id(class_subject_id) {
                return Some(actor_id);
            }
        }
        if let Some(teacher_id) = provenance.teacher_id {
            if let Some(actor_id) = relations.teacher(teacher_id).and_then(|t| t.actor_id) {
                return Some(actor_id);
            }
        }

        match self.directory.first_actor_with_role(Role::Admin) {
            Ok(Some(admin)) => Some(admin.id),
            Ok(None) => None,
            Err(error) => {
                tracing::debug!(%error, "admin fallback lookup failed");
                None
            }
        }
    }
}
