//! # Authorization Gate
//!
//! Role resolution and the stateless permission predicates. An incoming
//! request's acting user is resolved exactly once into an [`Actor`] tagged
//! union; every later check pattern-matches that value instead of probing
//! the database for profiles again. Listing queries all consume the same
//! [`Visibility`] scope so that no endpoint can drift from the hierarchy.

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    QueryTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::ExeatAction;
use crate::models::user::UserRole;
use crate::models::{exeat, house, house_supervisor, security_person, student, sub_admin, user};

/// Authenticated caller with their role-specific scope, resolved once at
/// authentication time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Global administrator; sees and may do everything
    Admin { user_id: Uuid },
    /// School-scoped administrator
    SubAdmin { user_id: Uuid, school_id: Uuid },
    /// Supervisor of one house; the school is fixed transitively
    HouseSupervisor {
        user_id: Uuid,
        house_id: Uuid,
        school_id: Uuid,
    },
    /// Security officer of one school
    Security { user_id: Uuid, school_id: Uuid },
    /// Student; may read and create their own exeats only
    Student {
        user_id: Uuid,
        student_id: Uuid,
        school_id: Uuid,
        house_id: Option<Uuid>,
    },
}

impl Actor {
    /// Identity behind this actor, recorded in audit fields
    pub fn user_id(&self) -> Uuid {
        match self {
            Actor::Admin { user_id }
            | Actor::SubAdmin { user_id, .. }
            | Actor::HouseSupervisor { user_id, .. }
            | Actor::Security { user_id, .. }
            | Actor::Student { user_id, .. } => *user_id,
        }
    }

    /// Stable role label used in logs
    pub fn role_name(&self) -> &'static str {
        match self {
            Actor::Admin { .. } => "admin",
            Actor::SubAdmin { .. } => "sub_admin",
            Actor::HouseSupervisor { .. } => "house_supervisor",
            Actor::Security { .. } => "security",
            Actor::Student { .. } => "student",
        }
    }

    /// Whether this actor may manage directory entities (schools, houses,
    /// students, staff) at all; per-entity school checks still apply.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Actor::Admin { .. } | Actor::SubAdmin { .. })
    }
}

/// The slice of an exeat the gate needs: where it lives and whose it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExeatContext {
    /// School owning the exeat
    pub school_id: Uuid,
    /// Student the exeat belongs to
    pub student_id: Uuid,
    /// The student's house at evaluation time, if any
    pub house_id: Option<Uuid>,
}

/// Whether `actor` may apply `action` to the exeat described by `ctx`.
///
/// Approvals belong to administrators, the school's sub-admin and the
/// student's house supervisor; sign-out/sign-in belong to administrators
/// and the school's security officers. Students never transition anything,
/// their own exeats included.
pub fn can_transition(actor: &Actor, ctx: &ExeatContext, action: ExeatAction) -> bool {
    match action {
        ExeatAction::Approve | ExeatAction::Reject => match actor {
            Actor::Admin { .. } => true,
            Actor::SubAdmin { school_id, .. } => *school_id == ctx.school_id,
            Actor::HouseSupervisor { house_id, .. } => ctx.house_id == Some(*house_id),
            Actor::Security { .. } | Actor::Student { .. } => false,
        },
        ExeatAction::SignOut | ExeatAction::SignIn => match actor {
            Actor::Admin { .. } => true,
            Actor::Security { school_id, .. } => *school_id == ctx.school_id,
            Actor::SubAdmin { .. } | Actor::HouseSupervisor { .. } | Actor::Student { .. } => false,
        },
    }
}

/// Whether `actor` may create an exeat for the student described by `ctx`.
pub fn can_create(actor: &Actor, ctx: &ExeatContext) -> bool {
    match actor {
        Actor::Admin { .. } => true,
        Actor::SubAdmin { school_id, .. } => *school_id == ctx.school_id,
        Actor::HouseSupervisor { house_id, .. } => ctx.house_id == Some(*house_id),
        Actor::Student { student_id, .. } => *student_id == ctx.student_id,
        Actor::Security { .. } => false,
    }
}

/// Whether `actor` may read the exeat described by `ctx`.
pub fn can_view(actor: &Actor, ctx: &ExeatContext) -> bool {
    match visibility(actor) {
        Visibility::Everything => true,
        Visibility::School(school_id) => school_id == ctx.school_id,
        Visibility::House(house_id) => ctx.house_id == Some(house_id),
        Visibility::OwnStudent(student_id) => student_id == ctx.student_id,
    }
}

/// Read scope of an actor, consumed uniformly by every listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Global administrators see everything
    Everything,
    /// Sub-admins and security see their school
    School(Uuid),
    /// House supervisors see their house's students
    House(Uuid),
    /// Students see their own records only
    OwnStudent(Uuid),
}

/// Maps an actor onto its read scope.
pub fn visibility(actor: &Actor) -> Visibility {
    match actor {
        Actor::Admin { .. } => Visibility::Everything,
        Actor::SubAdmin { school_id, .. } | Actor::Security { school_id, .. } => {
            Visibility::School(*school_id)
        }
        Actor::HouseSupervisor { house_id, .. } => Visibility::House(*house_id),
        Actor::Student { student_id, .. } => Visibility::OwnStudent(*student_id),
    }
}

impl Visibility {
    /// Filter condition over the exeats table for this scope.
    pub fn exeat_condition(&self) -> Condition {
        match self {
            Visibility::Everything => Condition::all(),
            Visibility::School(school_id) => {
                Condition::all().add(exeat::Column::SchoolId.eq(*school_id))
            }
            Visibility::House(house_id) => Condition::all().add(
                exeat::Column::StudentId.in_subquery(
                    student::Entity::find()
                        .select_only()
                        .column(student::Column::Id)
                        .filter(student::Column::HouseId.eq(*house_id))
                        .into_query(),
                ),
            ),
            Visibility::OwnStudent(student_id) => {
                Condition::all().add(exeat::Column::StudentId.eq(*student_id))
            }
        }
    }

    /// Filter condition over the students table for this scope.
    pub fn student_condition(&self) -> Condition {
        match self {
            Visibility::Everything => Condition::all(),
            Visibility::School(school_id) => {
                Condition::all().add(student::Column::SchoolId.eq(*school_id))
            }
            Visibility::House(house_id) => {
                Condition::all().add(student::Column::HouseId.eq(*house_id))
            }
            Visibility::OwnStudent(student_id) => {
                Condition::all().add(student::Column::Id.eq(*student_id))
            }
        }
    }
}

/// Errors resolving an acting user into an [`Actor`]
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("unknown acting user")]
    UnknownUser,
    #[error("identity carries the {role} role but has no matching profile")]
    MissingProfile { role: &'static str },
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Resolves a user id into an [`Actor`] by loading the role profile once.
pub async fn resolve_actor(db: &DatabaseConnection, user_id: Uuid) -> Result<Actor, ActorError> {
    let account = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ActorError::UnknownUser)?;

    match account.role {
        UserRole::Admin => Ok(Actor::Admin { user_id }),
        UserRole::SubAdmin => {
            let profile = sub_admin::Entity::find()
                .filter(sub_admin::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or(ActorError::MissingProfile { role: "sub_admin" })?;
            Ok(Actor::SubAdmin {
                user_id,
                school_id: profile.school_id,
            })
        }
        UserRole::HouseSupervisor => {
            let profile = house_supervisor::Entity::find()
                .filter(house_supervisor::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or(ActorError::MissingProfile {
                    role: "house_supervisor",
                })?;
            let house = house::Entity::find_by_id(profile.house_id)
                .one(db)
                .await?
                .ok_or(ActorError::MissingProfile {
                    role: "house_supervisor",
                })?;
            Ok(Actor::HouseSupervisor {
                user_id,
                house_id: profile.house_id,
                school_id: house.school_id,
            })
        }
        UserRole::Security => {
            let profile = security_person::Entity::find()
                .filter(security_person::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or(ActorError::MissingProfile { role: "security" })?;
            Ok(Actor::Security {
                user_id,
                school_id: profile.school_id,
            })
        }
        UserRole::Student => {
            let profile = student::Entity::find()
                .filter(student::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or(ActorError::MissingProfile { role: "student" })?;
            Ok(Actor::Student {
                user_id,
                student_id: profile.id,
                school_id: profile.school_id,
                house_id: profile.house_id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(school: Uuid, student: Uuid, house: Option<Uuid>) -> ExeatContext {
        ExeatContext {
            school_id: school,
            student_id: student,
            house_id: house,
        }
    }

    #[test]
    fn admin_passes_every_action() {
        let actor = Actor::Admin {
            user_id: Uuid::new_v4(),
        };
        let context = ctx(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()));

        for action in [
            ExeatAction::Approve,
            ExeatAction::Reject,
            ExeatAction::SignOut,
            ExeatAction::SignIn,
        ] {
            assert!(can_transition(&actor, &context, action));
        }
        assert!(can_create(&actor, &context));
        assert!(can_view(&actor, &context));
    }

    #[test]
    fn sub_admin_is_bound_to_their_school() {
        let school_a = Uuid::new_v4();
        let school_b = Uuid::new_v4();
        let actor = Actor::SubAdmin {
            user_id: Uuid::new_v4(),
            school_id: school_a,
        };

        let own = ctx(school_a, Uuid::new_v4(), None);
        let foreign = ctx(school_b, Uuid::new_v4(), None);

        assert!(can_transition(&actor, &own, ExeatAction::Approve));
        assert!(!can_transition(&actor, &foreign, ExeatAction::Approve));
        assert!(!can_transition(&actor, &foreign, ExeatAction::Reject));
        // Sub-admins approve; they do not staff the gate.
        assert!(!can_transition(&actor, &own, ExeatAction::SignOut));
        assert!(!can_transition(&actor, &own, ExeatAction::SignIn));
    }

    #[test]
    fn supervisor_is_bound_to_their_house() {
        let school = Uuid::new_v4();
        let house_a = Uuid::new_v4();
        let house_b = Uuid::new_v4();
        let actor = Actor::HouseSupervisor {
            user_id: Uuid::new_v4(),
            house_id: house_a,
            school_id: school,
        };

        let own_house = ctx(school, Uuid::new_v4(), Some(house_a));
        let other_house = ctx(school, Uuid::new_v4(), Some(house_b));
        let houseless = ctx(school, Uuid::new_v4(), None);

        assert!(can_transition(&actor, &own_house, ExeatAction::Approve));
        assert!(!can_transition(&actor, &other_house, ExeatAction::Approve));
        assert!(!can_transition(&actor, &houseless, ExeatAction::Approve));
        assert!(!can_transition(&actor, &own_house, ExeatAction::SignOut));
    }

    #[test]
    fn security_signs_but_never_approves() {
        let school_a = Uuid::new_v4();
        let school_b = Uuid::new_v4();
        let actor = Actor::Security {
            user_id: Uuid::new_v4(),
            school_id: school_a,
        };

        let own = ctx(school_a, Uuid::new_v4(), None);
        let foreign = ctx(school_b, Uuid::new_v4(), None);

        assert!(can_transition(&actor, &own, ExeatAction::SignOut));
        assert!(can_transition(&actor, &own, ExeatAction::SignIn));
        assert!(!can_transition(&actor, &foreign, ExeatAction::SignOut));
        assert!(!can_transition(&actor, &own, ExeatAction::Approve));
        assert!(!can_transition(&actor, &own, ExeatAction::Reject));
        assert!(!can_create(&actor, &own));
    }

    #[test]
    fn student_reads_and_creates_own_but_never_transitions() {
        let school = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let actor = Actor::Student {
            user_id: Uuid::new_v4(),
            student_id,
            school_id: school,
            house_id: None,
        };

        let own = ctx(school, student_id, None);
        let other = ctx(school, Uuid::new_v4(), None);

        assert!(can_create(&actor, &own));
        assert!(can_view(&actor, &own));
        assert!(!can_create(&actor, &other));
        assert!(!can_view(&actor, &other));
        for action in [
            ExeatAction::Approve,
            ExeatAction::Reject,
            ExeatAction::SignOut,
            ExeatAction::SignIn,
        ] {
            assert!(!can_transition(&actor, &own, action));
            assert!(!can_transition(&actor, &other, action));
        }
    }

    #[test]
    fn visibility_mirrors_the_role_hierarchy() {
        let school = Uuid::new_v4();
        let house = Uuid::new_v4();
        let student = Uuid::new_v4();

        assert_eq!(
            visibility(&Actor::Admin {
                user_id: Uuid::new_v4()
            }),
            Visibility::Everything
        );
        assert_eq!(
            visibility(&Actor::SubAdmin {
                user_id: Uuid::new_v4(),
                school_id: school
            }),
            Visibility::School(school)
        );
        assert_eq!(
            visibility(&Actor::Security {
                user_id: Uuid::new_v4(),
                school_id: school
            }),
            Visibility::School(school)
        );
        assert_eq!(
            visibility(&Actor::HouseSupervisor {
                user_id: Uuid::new_v4(),
                house_id: house,
                school_id: school
            }),
            Visibility::House(house)
        );
        assert_eq!(
            visibility(&Actor::Student {
                user_id: Uuid::new_v4(),
                student_id: student,
                school_id: school,
                house_id: Some(house)
            }),
            Visibility::OwnStudent(student)
        );
    }
}
