//! Integration tests for passive provider interception

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wireup::{Container, Error, PassiveOptions, ProvideOptions};

/// Hands out database handles by identifier.
#[derive(Debug)]
struct Factory;

impl Factory {
    fn open(&self, name: &str) -> Handle {
        Handle { name: name.into() }
    }
}

#[derive(Debug)]
struct Handle {
    name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("name must start with \"db_\", but got \"{requested}\"")]
struct BadName {
    requested: String,
}

/// Container wired like the reference scenario: an explicit factory, a
/// passive provider that trims the `db_` prefix, and a pre-registered
/// handle named `dbx`.
fn scenario_container(calls: Arc<AtomicUsize>) -> Container {
    let container = Container::new();
    container.provide(|| Factory).unwrap();
    container
        .passive_provide(move |name: String, factory: Arc<Factory>| -> Result<Handle, BadName> {
            calls.fetch_add(1, Ordering::SeqCst);
            match name.strip_prefix("db_") {
                Some(trimmed) => Ok(factory.open(trimmed)),
                None => Err(BadName { requested: name }),
            }
        })
        .unwrap();
    container
        .insert_as(Handle { name: "x".into() }, ProvideOptions::new().name("dbx"))
        .unwrap();
    container
}

mod fallback {
    use super::*;

    #[test]
    fn distinct_names_get_independent_handles() {
        let container = scenario_container(Arc::new(AtomicUsize::new(0)));

        let alpha = container.get_named::<Handle>("db_alpha").unwrap();
        let beta = container.get_named::<Handle>("db_beta").unwrap();
        assert_eq!(alpha.name, "alpha");
        assert_eq!(beta.name, "beta");
    }

    #[test]
    fn explicit_registration_bypasses_the_interceptor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = scenario_container(calls.clone());

        let x = container.get_named::<Handle>("dbx").unwrap();
        assert_eq!(x.name, "x");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_requests_reuse_the_synthesized_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = scenario_container(calls.clone());

        let first = container.get_named::<Handle>("db_alpha").unwrap();
        let second = container.get_named::<Handle>("db_alpha").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejection_message_is_preserved_verbatim() {
        let container = scenario_container(Arc::new(AtomicUsize::new(0)));

        let err = container.get_named::<Handle>("xyz").unwrap_err();
        assert!(
            err.to_string()
                .contains("name must start with \"db_\", but got \"xyz\"")
        );
    }

    #[test]
    fn unnamed_request_reaches_the_interceptor_with_an_empty_name() {
        let container = scenario_container(Arc::new(AtomicUsize::new(0)));

        let err = container.get::<Handle>().unwrap_err();
        assert!(err.to_string().contains("but got \"\""));
    }

    #[test]
    fn no_matching_interceptor_stays_unresolved() {
        let container = scenario_container(Arc::new(AtomicUsize::new(0)));

        let err = container.get_named::<Factory>("other").unwrap_err();
        assert!(matches!(err, Error::UnresolvedDependency { .. }));
        assert!(err.to_string().contains("other"));
    }
}

mod name_argument {
    use super::*;

    #[test]
    fn name_position_is_selectable() {
        let container = Container::new();
        container.provide(|| Factory).unwrap();
        container
            .passive_provide_as(
                |factory: Arc<Factory>, name: String| -> Result<Handle, BadName> {
                    Ok(factory.open(&name))
                },
                PassiveOptions::new().name_index(1),
            )
            .unwrap();

        assert_eq!(container.get_named::<Handle>("plain").unwrap().name, "plain");
    }

    #[test]
    fn synthesized_name_keys_never_collide() {
        let container = Container::new();
        container
            .passive_provide(|name: String| -> Result<Handle, BadName> {
                Ok(Handle { name })
            })
            .unwrap();

        // Same requested name through two containers' worth of requests on
        // one container: each synthesis mints a fresh argument key, so the
        // second request must not observe the first one's name value.
        assert_eq!(container.get_named::<Handle>("a").unwrap().name, "a");
        assert_eq!(container.get_named::<Handle>("b").unwrap().name, "b");
    }

    #[test]
    fn wrong_name_position_fails_registration() {
        let container = Container::new();
        let err = container
            .passive_provide(|_factory: Arc<Factory>, name: String| -> Result<Handle, BadName> {
                Ok(Handle { name })
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInterceptorShape { .. }));
    }

    #[test]
    fn out_of_range_name_position_fails_registration() {
        let container = Container::new();
        let err = container
            .passive_provide_as(
                |name: String| -> Result<Handle, BadName> { Ok(Handle { name }) },
                PassiveOptions::new().name_index(5),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInterceptorShape { .. }));
    }
}

mod chained {
    use super::*;

    struct Conn {
        label: String,
    }

    #[test]
    fn an_interceptors_constructor_may_itself_be_intercepted() {
        let container = Container::new();
        container.provide(|| Factory).unwrap();
        // Handles come from one passive provider...
        container
            .passive_provide(move |name: String, factory: Arc<Factory>| -> Result<Handle, BadName> {
                Ok(factory.open(&name))
            })
            .unwrap();
        // ...and connections depend on a handle that only interception can
        // produce.
        container
            .passive_provide(|name: String, handle: Arc<Handle>| -> Result<Conn, BadName> {
                Ok(Conn {
                    label: format!("{}:{}", name, handle.name),
                })
            })
            .unwrap();

        let conn = container.get_named::<Conn>("edge").unwrap();
        assert_eq!(conn.label, "edge:");
    }
}
