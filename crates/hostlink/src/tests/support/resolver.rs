//! `mockall` double for [`TypeResolver`].

use mockall::mock;

use crate::resolver::{ROOT_TYPE, TypeRef, TypeResolver};

mock! {
    pub Resolver {}
    impl TypeResolver for Resolver {
        fn resolve<'a>(&self, name: &str, expected_base: Option<&'a str>) -> Option<TypeRef>;
        fn types_deriving_from(&self, base: &str) -> Vec<TypeRef>;
    }
}

/// Blueprintable types named `Type0..TypeN` deriving directly from the root.
#[must_use]
pub fn synthetic_types(count: usize) -> Vec<TypeRef> {
    (0..count)
        .map(|index| {
            let name = format!("Type{index}");
            TypeRef::new(&name, Some(ROOT_TYPE), &format!("/Script/Test.{name}"), true)
        })
        .collect()
}

/// Mock that knows the root type and reports `types` as its descendants.
#[must_use]
pub fn resolver_with_types(types: Vec<TypeRef>) -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|name: &str, _expected: Option<&str>| {
            (name == ROOT_TYPE).then(|| TypeRef::new(ROOT_TYPE, None, "/Script/Test.Object", true))
        });
    resolver
        .expect_types_deriving_from()
        .returning(move |_base: &str| types.clone());
    resolver
}
