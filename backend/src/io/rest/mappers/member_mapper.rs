//! backend/src/io/rest/mappers/member_mapper.rs

use super::format_instant;
use crate::domain::commands::members::{CreateMemberCommand, UpdateMemberCommand};
use crate::domain::models::Member as DomainMember;
use shared::{CreateMemberRequest, Member as SharedMember, UpdateMemberRequest};

/// Mapper between shared Member DTOs and domain member types.
pub struct MemberMapper;

impl MemberMapper {
    pub fn to_create_command(request: CreateMemberRequest) -> CreateMemberCommand {
        CreateMemberCommand {
            code: request.code,
            name: request.name,
        }
    }

    pub fn to_update_command(request: UpdateMemberRequest) -> UpdateMemberCommand {
        UpdateMemberCommand {
            code: request.code,
            name: request.name,
        }
    }

    pub fn to_dto(domain: DomainMember) -> SharedMember {
        SharedMember {
            code: domain.code,
            name: domain.name,
            borrowed_books_count: domain.borrowed_books_count,
            is_penalized: domain.is_penalized,
            penalty_expires_at: domain.penalty_expires_at.map(format_instant),
        }
    }

    pub fn to_list_dto(members: Vec<DomainMember>) -> Vec<SharedMember> {
        members.into_iter().map(Self::to_dto).collect()
    }
}
