//! The process-wide catalog can be installed exactly once. Kept in its own
//! test binary so no other test observes the installed state.

use lectern_schema::{define_object_type, Catalog, CatalogError, FieldSpec};
use lectern_core::FieldKind;

#[test]
fn test_install_once_then_read() {
    assert_eq!(Catalog::global().unwrap_err(), CatalogError::NotInstalled);

    let tree = define_object_type("tag", vec![FieldSpec::new("label", FieldKind::String)]).unwrap();
    let installed = Catalog::from_trees([tree]).unwrap().install().unwrap();
    assert_eq!(installed.names().collect::<Vec<_>>(), vec!["tag"]);

    let again = Catalog::default().install();
    assert_eq!(again.unwrap_err(), CatalogError::AlreadyInstalled);
    assert!(std::ptr::eq(Catalog::global().unwrap(), installed));
}
