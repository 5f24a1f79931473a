//! Prints the TypeScript declarations shared with the browser console.
//!
//! Usage: `cargo run -p models --bin generate-types [OUTPUT]`

use std::{env, fs, io};

use models::{
    auth::{LoginRequest, LoginResponse},
    collection::{Collection, CollectionFilter, CollectionKind, CollectionSummary, CreateCollection},
    entity::{CreateEntity, Entity, EntityKind, UpdateEntity},
    field_descriptor::{FieldDescriptor, FieldKind, FieldSpec, FieldValue},
    member::{Member, MemberPayload, MemberQuery, MemberStatus},
    user::{CreateUser, UpdateUser, User, UserRole},
};
use ts_rs::TS;

fn main() -> io::Result<()> {
    let decls = [
        FieldKind::decl(),
        FieldSpec::decl(),
        FieldDescriptor::decl(),
        FieldValue::decl(),
        MemberStatus::decl(),
        Member::decl(),
        MemberPayload::decl(),
        MemberQuery::decl(),
        CollectionKind::decl(),
        Collection::decl(),
        CreateCollection::decl(),
        CollectionFilter::decl(),
        CollectionSummary::decl(),
        EntityKind::decl(),
        Entity::decl(),
        CreateEntity::decl(),
        UpdateEntity::decl(),
        UserRole::decl(),
        User::decl(),
        CreateUser::decl(),
        UpdateUser::decl(),
        LoginRequest::decl(),
        LoginResponse::decl(),
    ];

    let mut output = String::from("// Generated by `generate-types`. Do not edit.\n\n");
    for decl in decls {
        output.push_str("export ");
        output.push_str(&decl);
        output.push_str("\n\n");
    }

    match env::args().nth(1) {
        Some(path) => fs::write(path, output),
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}
