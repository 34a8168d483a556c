//! Member directory service.
//!
//! Registration, edits and listing of library members. Listing always runs the
//! penalty-lapse sweep first, so callers never see a penalty whose window has
//! already closed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::members::{CreateMemberCommand, UpdateMemberCommand};
use crate::domain::errors::{EntityKind, LibraryError, LibraryResult};
use crate::domain::models::{Member, MemberChanges, NewMember};
use crate::domain::validation::require_text;
use crate::storage::{Connection, MemberStorage, StorageError};

pub struct MemberService<C: Connection> {
    member_repository: C::MemberRepository,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> MemberService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        let member_repository = connection.create_member_repository();
        Self { member_repository, clock }
    }

    /// Register a new member with no loans and no penalty
    pub async fn create(&self, command: CreateMemberCommand) -> LibraryResult<String> {
        info!("Creating member: {:?}", command);

        require_text("code", &command.code)?;
        require_text("name", &command.name)?;

        if self.member_repository.find_member_by_code(&command.code).await?.is_some() {
            warn!("Member code {} is already taken", command.code);
            return Err(conflict(command.code));
        }

        let new_member = NewMember {
            code: command.code,
            name: command.name,
            created_at: self.clock.now(),
        };

        match self.member_repository.insert_member(&new_member).await {
            Ok(member) => {
                info!("Created member {} with id {}", member.code, member.id);
                Ok(member.code)
            }
            Err(StorageError::UniqueViolation(_)) => {
                warn!("Member code {} was taken concurrently", new_member.code);
                Err(conflict(new_member.code))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All members, after clearing lapsed penalties
    pub async fn list(&self) -> LibraryResult<Vec<Member>> {
        self.lapse_expired_penalties().await?;

        let members = self.member_repository.list_members().await?;
        info!("Listed {} members", members.len());
        Ok(members)
    }

    pub async fn update_by_code(&self, code: &str, command: UpdateMemberCommand) -> LibraryResult<()> {
        info!("Updating member {}: {:?}", code, command);

        let member = self
            .member_repository
            .find_member_by_code(code)
            .await?
            .ok_or_else(|| LibraryError::member_not_found(code))?;

        let mut changes = MemberChanges::from_existing(&member);
        if let Some(new_code) = command.code {
            require_text("code", &new_code)?;
            changes.code = new_code;
        }
        if let Some(name) = command.name {
            require_text("name", &name)?;
            changes.name = name;
        }

        if let Some(holder) = self.member_repository.find_member_by_code(&changes.code).await? {
            if holder.id != member.id {
                warn!("Cannot rename member {} to {}: code is taken", member.code, changes.code);
                return Err(conflict(changes.code));
            }
        }

        match self.member_repository.update_member(member.id, &changes).await {
            Ok(()) => {
                info!("Updated member {} (now {})", code, changes.code);
                Ok(())
            }
            Err(StorageError::UniqueViolation(_)) => Err(conflict(changes.code)),
            Err(e) => Err(e.into()),
        }
    }

    /// Clear every penalty that expired at or before the current instant.
    /// Returns how many members were cleared.
    pub async fn lapse_expired_penalties(&self) -> LibraryResult<u64> {
        let now = self.clock.now();
        let cleared = self.member_repository.lapse_expired_penalties(now).await?;
        if cleared > 0 {
            info!("Lapsed {} expired penalties", cleared);
        } else {
            debug!("No expired penalties at {}", now);
        }
        Ok(cleared)
    }
}

fn conflict(code: String) -> LibraryError {
    LibraryError::Conflict { entity: EntityKind::Member, code }
}
