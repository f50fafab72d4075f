//! Infers the authorization descriptor of a history schema.
//!
//! An explicit `Authz` annotation always wins. Without one, a schema that
//! declares its own policy keeps it and only gets owner flags, and everything
//! else falls back to naming heuristics over the schema's fields. A schema
//! with no usable signal gets a disabled policy.

use annal_core::{
  annotation::AuthzAnnotation,
  authz::{AuthzPolicyDescriptor, REF_ID_FIELD, history_id_field},
  config::AuthConfig,
  schema::SchemaDefinition,
};
use convert_case::{Case, Casing};
use tracing::{debug, warn};

const OWNER_FIELD: &str = "owner_id";
const ORGANIZATION_FIELD: &str = "organization_id";

/// Build the policy descriptor for the history schema of `schema`.
pub fn infer_policy(
  schema: &SchemaDefinition,
  auth: &AuthConfig,
) -> AuthzPolicyDescriptor {
  let mut policy = AuthzPolicyDescriptor {
    enabled: auth.enabled,
    allowed_relation: auth.allowed_relation.clone(),
    ..AuthzPolicyDescriptor::default()
  };

  if !policy.enabled {
    return policy;
  }

  match authz_annotation(schema) {
    Some(annotation) => apply_annotation(&mut policy, schema, &annotation),
    // The schema already carries its own authorization logic.
    None if schema.policy.is_some() => {}
    None => {
      if !apply_heuristics(&mut policy, schema) {
        debug!(schema = %schema.name, "no authz signal, disabling policy");
        policy.enabled = false;
        return policy;
      }
    }
  }

  policy.org_owned = is_org_owned(schema);
  policy.user_owned = is_user_owned(schema);
  policy
}

/// The comment of the mixed-in `owner_id` field, if the schema has one.
fn owner_comment(schema: &SchemaDefinition) -> Option<&str> {
  schema
    .fields
    .iter()
    .find(|f| f.position.mixed_in && f.name == OWNER_FIELD)
    .map(|f| f.comment.as_str())
}

/// True if the mixed-in owner field documents an organization owner.
// TODO: read an explicit ownership tag from the mixin once the schema
// loader exposes one; the comment match breaks if the docs are reworded.
pub fn is_org_owned(schema: &SchemaDefinition) -> bool {
  owner_comment(schema).is_some_and(|c| c.contains("organization"))
}

/// True if the mixed-in owner field documents a user owner.
pub fn is_user_owned(schema: &SchemaDefinition) -> bool {
  owner_comment(schema).is_some_and(|c| c.contains("user"))
}

fn authz_annotation(schema: &SchemaDefinition) -> Option<AuthzAnnotation> {
  match AuthzAnnotation::from_schema(schema) {
    Ok(annotation) => annotation,
    Err(e) => {
      warn!(schema = %schema.name, "ignoring malformed Authz annotation: {e}");
      None
    }
  }
}

fn apply_annotation(
  policy: &mut AuthzPolicyDescriptor,
  schema: &SchemaDefinition,
  annotation: &AuthzAnnotation,
) {
  policy.nillable_id_field = annotation.nillable_id_field;
  policy.object_type = if annotation.object_type.is_empty() {
    schema.name.to_lowercase()
  } else {
    annotation.object_type.clone()
  };
  policy.id_field = history_id_field(&annotation.id_field);

  if !annotation.allowed_relation.is_empty() {
    policy.allowed_relation = annotation.allowed_relation.clone();
  }
}

/// Guess object type and id field from the schema's name and fields.
/// Returns false when nothing matched.
fn apply_heuristics(
  policy: &mut AuthzPolicyDescriptor,
  schema: &SchemaDefinition,
) -> bool {
  let name = schema.name.as_str();

  if name == "Organization" || name == "User" {
    policy.id_field = REF_ID_FIELD.to_owned();
    policy.object_type = name.to_lowercase();
    policy.nillable_id_field = false;
    return true;
  }

  let parent = name.strip_suffix("Setting").unwrap_or(name);
  if name.contains("Setting") && !parent.is_empty() {
    policy.id_field = format!("{parent}ID");
    policy.object_type = parent.to_case(Case::Snake);
    policy.nillable_id_field = true;
    return true;
  }

  if schema.has_field(ORGANIZATION_FIELD) {
    policy.id_field = "OrganizationID".to_owned();
    policy.object_type = "organization".to_owned();
    policy.nillable_id_field = false;
    return true;
  }

  if schema.has_field(OWNER_FIELD) {
    policy.id_field = "OwnerID".to_owned();
    policy.object_type = if is_user_owned(schema) {
      "user".to_owned()
    } else {
      "organization".to_owned()
    };
    policy.nillable_id_field = true;
    return true;
  }

  false
}
