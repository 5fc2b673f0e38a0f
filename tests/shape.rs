mod resource {
    pub mod entities;
    pub mod memory;
}

#[cfg(test)]
mod tests {
    use crate::resource::{
        entities::{Address, AuditLine, Customer, Enrollment, OrderView, User},
        memory::init_logs,
    };
    use keel::{
        DeclKind, Entity, EntityAttributes, EntityShape, ErrorExt, FieldDecl, FieldPolicy,
        FieldRole, KeyTarget, Record, Registry, RegistrationState, ShapeError, ValueKind,
    };

    fn shape_error<E: Entity>() -> ShapeError {
        let error = E::shape().expect_err("the shape should be rejected");
        assert!(error.is_shape_error(), "{error:#}");
        error.downcast_ref::<ShapeError>().unwrap().clone()
    }

    #[test]
    fn shape_user() {
        init_logs();
        let shape = User::shape().unwrap();
        assert_eq!(shape.entity, "User");
        assert_eq!(shape.table_name(), "users");
        assert_eq!(
            shape.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            ["id", "name", "email", "password", "age", "display_name", "updated_at"]
        );
        assert_eq!(shape.primary, Some(0));
        assert_eq!(shape.primary_field().unwrap().kind, ValueKind::Int64);
        assert!(matches!(shape.key(), Some(KeyTarget::Primary(0))));
        assert!(!shape.has_joined_columns);
        assert!(shape.composite_groups.is_empty());

        let display_name = shape.field("display_name").unwrap();
        assert!(display_name.policy.omit_always);
        assert!(!display_name.policy.insertable());
        assert!(!display_name.policy.updatable());
        let updated_at = shape.field("updated_at").unwrap();
        assert!(updated_at.policy.auto_timestamp_on_update);
        assert_eq!(updated_at.kind, ValueKind::Timestamp);

        assert!(shape.is_redacted("password"));
        assert!(shape.is_redacted("PASSWORD"));
        assert!(!shape.is_redacted("name"));

        assert!(shape.finder(&["email"]).is_some());
        assert!(shape.finder(&["id"]).is_some());
        assert!(shape.finder(&["name"]).is_none());
        assert_eq!(shape.finders().count(), 2);

        // Compiled once
        assert!(std::sync::Arc::ptr_eq(&shape, &User::shape().unwrap()));
    }

    #[test]
    fn shape_embedded() {
        let shape = Customer::shape().unwrap();
        assert_eq!(
            shape.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            [
                "id",
                "name",
                "address.street",
                "address.city",
                "address.zip",
                "contact.phone",
                "contact.email",
            ]
        );
        assert_eq!(
            shape.fields.iter().map(|f| f.column).collect::<Vec<_>>(),
            ["id", "name", "street", "city", "zip", "phone", "contact_email"]
        );
        assert_eq!(
            shape.fields.iter().map(|f| f.leaf).collect::<Vec<_>>(),
            [0, 1, 2, 3, 4, 5, 6]
        );
        let phone = shape.field("contact.phone").unwrap();
        assert_eq!(phone.path, ["contact", "phone"]);
        assert!(phone.optional);
        assert!(phone.is_nested());
        assert!(!shape.field("address.city").unwrap().optional);
        assert!(!shape.field("name").unwrap().is_nested());
        assert!(shape.is_redacted("zip"));
        assert!(shape.field("cached_score").is_none());
        assert_eq!(Customer::leaf_count(), 7);
        assert_eq!(Address::leaf_count(), 3);
    }

    #[test]
    fn shape_policy_inherited() {
        #[derive(Entity, Default)]
        struct Shipment {
            #[keel(primary)]
            id: i64,
            #[keel(embed, updatable = false, sensitive)]
            origin: Address,
            #[keel(embed)]
            destination: Address,
        }
        let shape = Shipment::shape().unwrap();
        assert_eq!(shape.table_name(), "shipment");
        let origin = shape.field("origin.street").unwrap();
        assert!(!origin.policy.updatable());
        assert!(origin.policy.insertable());
        assert!(origin.policy.redact_in_logs);
        let destination = shape.field("destination.street").unwrap();
        assert!(destination.policy.updatable());
        assert!(!destination.policy.redact_in_logs);
        // Nested fields share the column, sensitivity applies to the column
        assert!(shape.is_redacted("street"));
        assert!(shape.is_redacted("zip"));
        assert_eq!(shape.fields.len(), 7);
    }

    #[test]
    fn shape_composite() {
        let shape = Enrollment::shape().unwrap();
        assert_eq!(shape.primary, None);
        assert_eq!(shape.composite_groups.len(), 1);
        let group = &shape.composite_groups[0];
        assert_eq!(group.name, "enrollment");
        let names = group
            .fields
            .iter()
            .map(|i| shape.fields[*i].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["course_id", "student_id"]);
        assert_eq!(shape.key_fields(), group.fields);
        assert!(matches!(shape.key(), Some(KeyTarget::Composite(..))));
        assert!(shape.finder(&["student_id", "course_id"]).is_some());
        assert_eq!(
            shape.finder(&["student_id", "course_id"]),
            shape.finder(&["course_id", "student_id"])
        );
        assert_eq!(shape.finder(&["student_id"]).unwrap().fields, vec![0]);
        assert!(shape.finder(&["course_id"]).is_none());
    }

    #[test]
    fn shape_joined() {
        let shape = OrderView::shape().unwrap();
        assert!(shape.read_only);
        assert!(shape.has_joined_columns);
        let customer = shape.field("customer_name").unwrap();
        assert_eq!(customer.table, Some("customers"));
        assert_eq!(customer.column, "name");
        assert_eq!(customer.qualified_column(), "customers.name");
    }

    #[test]
    fn shape_keyless_rejected() {
        #[derive(Entity, Default)]
        struct Measurement {
            value: f64,
        }
        assert_eq!(
            shape_error::<Measurement>(),
            ShapeError::NoKey {
                entity: "Measurement"
            }
        );

        let registry = Registry::new();
        let error = registry.register::<AuditLine>().unwrap_err();
        assert_eq!(
            error.downcast_ref::<ShapeError>(),
            Some(&ShapeError::NoKey {
                entity: "AuditLine"
            })
        );
        assert_eq!(
            error.to_string(),
            "keel: shape: `AuditLine` declares neither a primary field nor a composite key"
        );
        assert_eq!(registry.state::<AuditLine>(), RegistrationState::Rejected);
    }

    #[test]
    fn shape_errors() {
        init_logs();

        #[derive(Entity, Default)]
        struct Joined {
            #[keel(primary)]
            id: i64,
            #[keel(column = "users.name")]
            name: String,
        }
        assert_eq!(
            shape_error::<Joined>(),
            ShapeError::JoinedColumn {
                entity: "Joined",
                field: "name".into(),
                column: "users.name".into(),
            }
        );

        #[derive(Entity, Default)]
        struct TwoPrimaries {
            #[keel(primary)]
            first: i64,
            #[keel(role = "primary")]
            second: i64,
        }
        assert_eq!(
            shape_error::<TwoPrimaries>(),
            ShapeError::DuplicatePrimary {
                entity: "TwoPrimaries",
                first: "first".into(),
                second: "second".into(),
            }
        );

        #[derive(Entity, Default)]
        struct Lonely {
            #[keel(role = "composite:pair")]
            a: i32,
            b: i32,
        }
        assert_eq!(
            shape_error::<Lonely>(),
            ShapeError::CompositeTooSmall {
                entity: "Lonely",
                group: "pair".into(),
                members: 1,
            }
        );

        #[derive(Entity, Default)]
        struct Empty {
            #[keel(skip)]
            _cache: Vec<u8>,
        }
        assert_eq!(
            shape_error::<Empty>(),
            ShapeError::NoFields { entity: "Empty" }
        );

        #[derive(Entity, Default)]
        struct Duplicated {
            #[keel(primary)]
            id: i64,
            name: String,
            #[keel(column = "NAME")]
            other_name: String,
        }
        assert_eq!(
            shape_error::<Duplicated>(),
            ShapeError::DuplicateColumn {
                entity: "Duplicated",
                column: "name".into(),
            }
        );

        #[derive(Entity, Default)]
        #[keel(find_by = "name, nickname")]
        struct BadFinder {
            #[keel(primary)]
            id: i64,
            name: String,
        }
        assert_eq!(
            shape_error::<BadFinder>(),
            ShapeError::UnknownFinderField {
                entity: "BadFinder",
                field: "nickname".into(),
            }
        );

        // Cached, same error again
        assert_eq!(
            shape_error::<BadFinder>().to_string(),
            "keel: shape: finder of `BadFinder` references the unknown field `nickname`"
        );
    }

    #[test]
    fn shape_errors_order() {
        #[derive(Entity, Default)]
        struct Everything {
            #[keel(primary, column = "a.id")]
            first: i64,
            #[keel(primary)]
            second: i64,
            #[keel(role = "composite:g")]
            third: i64,
        }
        assert!(matches!(
            shape_error::<Everything>(),
            ShapeError::JoinedColumn { .. }
        ));

        #[derive(Entity, Default)]
        #[keel(read_only)]
        struct ReadOnlyEverything {
            #[keel(primary, column = "a.id")]
            first: i64,
            #[keel(primary)]
            second: i64,
            #[keel(role = "composite:g")]
            third: i64,
        }
        assert!(matches!(
            shape_error::<ReadOnlyEverything>(),
            ShapeError::DuplicatePrimary { .. }
        ));
    }

    #[test]
    fn shape_compile_declarations() {
        let scalar = |name: &'static str, column: &'static str| FieldDecl {
            name,
            column,
            role: FieldRole::Ordinary,
            policy: FieldPolicy::default(),
            kind: DeclKind::Scalar(ValueKind::Varchar),
        };
        let shape = EntityShape::compile(
            "Report",
            || "reports",
            vec![
                FieldDecl {
                    role: FieldRole::Primary,
                    kind: DeclKind::Scalar(ValueKind::UInt32),
                    ..scalar("id", "id")
                },
                scalar("title", "title"),
                FieldDecl {
                    kind: DeclKind::Embedded {
                        fields: Address::declare_fields,
                        optional: true,
                    },
                    policy: FieldPolicy {
                        omit_always: true,
                        ..Default::default()
                    },
                    ..scalar("address", "address")
                },
            ],
            &EntityAttributes::default(),
        )
        .unwrap();
        assert_eq!(shape.table_name(), "reports");
        assert_eq!(shape.fields.len(), 5);
        let city = shape.field("address.city").unwrap();
        assert!(city.optional);
        assert!(city.policy.omit_on_insert);
        assert!(city.policy.omit_on_update);

        let error = EntityShape::compile(
            "Report",
            || "reports",
            vec![scalar("author", "people.name")],
            &EntityAttributes::default(),
        )
        .unwrap_err();
        assert!(matches!(error, ShapeError::JoinedColumn { .. }));

        let shape = EntityShape::compile(
            "Report",
            || "reports",
            vec![
                FieldDecl {
                    role: FieldRole::Primary,
                    ..scalar("id", "id")
                },
                scalar("author", "people.name"),
            ],
            &EntityAttributes {
                read_only: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(shape.has_joined_columns);

        let error =
            EntityShape::compile("Report", || "reports", vec![], &EntityAttributes::default())
                .unwrap_err();
        assert_eq!(error, ShapeError::NoFields { entity: "Report" });
    }
}
