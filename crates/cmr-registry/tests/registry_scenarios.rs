use cmr_registry::{ComponentRegistry, ComponentType, NameFingerprint, NewComponent, RegistryError};
use cmr_test_utils::{add_layer, fingerprint, id, init_test_tracing, new_layer, registry_with_defaults};
use pretty_assertions::assert_eq;
use uuid::Uuid;

#[test]
fn test_duplicate_layer_name() {
    init_test_tracing();
    let mut registry = ComponentRegistry::new();
    add_layer(&mut registry, "Base");

    let err = registry.add_component(new_layer("Base"), false).unwrap_err();
    assert!(err.is_business_failure());
    assert_eq!(
        err,
        RegistryError::NameInUse {
            component_type: ComponentType::Layer,
            name: "Base".into()
        }
    );

    let added = registry.add_component(new_layer("Base"), true).unwrap();
    assert!(added.name_changed);
    assert_eq!(added.assigned_name.as_deref(), Some("Base 01"));
    assert_eq!(added.item.name_fingerprint(), &fingerprint("Base 01"));
    registry.validate().unwrap();
}

#[test]
fn test_deleted_name_can_be_reused() {
    let mut registry = ComponentRegistry::new();
    let base = add_layer(&mut registry, "Base");
    registry.delete_component(base.id()).unwrap();

    assert!(!registry.name_in_use(ComponentType::Layer, &fingerprint("Base"), false));
    let again = registry.add_component(new_layer("Base"), false).unwrap();
    assert!(!again.name_changed);
    assert_eq!(again.assigned_name.as_deref(), Some("Base"));
    assert_eq!(again.item.index(), Some(1));
    registry.validate().unwrap();
}

#[test]
fn test_round_trip_by_id() {
    let mut registry = ComponentRegistry::new();
    let parent = id(77);
    let added = registry
        .add_component(new_layer("Doors").with_parent_id(parent).with_id(id(1)), false)
        .unwrap();

    let item = registry.item_from_id(id(1)).unwrap();
    assert_eq!(item, &added.item);
    assert_eq!(item.component_type(), ComponentType::Layer);
    assert_eq!(item.name_fingerprint(), &NameFingerprint::create(parent, "Doors"));
}

#[test]
fn test_archive_reload_by_fingerprint() {
    let source = cmr_test_utils::registry_with_layers(&["A", "B", "C"]);

    let mut reloaded = ComponentRegistry::new();
    for item in source.items(ComponentType::Layer) {
        reloaded
            .add_component(
                NewComponent::new(item.component_type())
                    .with_id(item.id())
                    .with_name_hash(*item.name_fingerprint()),
                false,
            )
            .unwrap();
    }

    let original: Vec<_> = source.items(ComponentType::Layer).copied().collect();
    let copy: Vec<_> = reloaded.items(ComponentType::Layer).copied().collect();
    assert_eq!(original, copy);
}

#[test]
fn test_serialized_items() {
    let registry = cmr_test_utils::registry_with_layers(&["Walls"]);
    let item = registry.first_item(ComponentType::Layer).unwrap();

    let json = serde_json::to_string(item).unwrap();
    let back: cmr_registry::ManifestItem = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, item);
}

#[test]
fn test_builtins_block_names() {
    let mut registry = registry_with_defaults();
    assert_eq!(registry.system_component_count(ComponentType::Material), 1);

    let err = registry
        .add_component(NewComponent::new(ComponentType::Material).with_name("default"), false)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NameInUse { .. }));

    let added = registry
        .add_component(NewComponent::new(ComponentType::Material).with_name("Default"), true)
        .unwrap();
    assert_eq!(added.item.index(), Some(0));
    assert_eq!(added.assigned_name.as_deref(), Some("Default 01"));
    registry.validate().unwrap();
}

#[test]
fn test_content_version_tracks_every_mutation() {
    let mut registry = ComponentRegistry::new();
    let mut last = registry.content_version();
    let mut bumped = |registry: &ComponentRegistry| {
        let now = registry.content_version();
        assert!(now > last);
        last = now;
    };

    let item = add_layer(&mut registry, "A");
    bumped(&registry);
    registry.change_component_name(item.id(), Uuid::nil(), "B").unwrap();
    bumped(&registry);
    registry.change_component_runtime_serial_number(item.id(), 5).unwrap();
    bumped(&registry);
    registry.delete_component(item.id()).unwrap();
    bumped(&registry);
    registry.undelete_component(item.id(), Uuid::nil(), "").unwrap();
    bumped(&registry);
    assert!(registry.remove_component_by_serial_number(5));
    bumped(&registry);
}

#[test]
fn test_failed_operations_leave_version() {
    let mut registry = ComponentRegistry::new();
    add_layer(&mut registry, "A");
    let version = registry.content_version();

    assert!(registry.add_component(new_layer("A"), false).is_err());
    assert!(registry.delete_component(id(404)).is_err());
    assert!(!registry.remove_component(id(404)));
    assert_eq!(registry.content_version(), version);
}

#[test]
fn test_embedded_files_by_path() {
    let mut registry = ComponentRegistry::new();
    let file = NewComponent::new(ComponentType::EmbeddedFile).with_name("C:\\Textures\\Oak.png");
    registry.add_component(file, false).unwrap();

    let same = NewComponent::new(ComponentType::EmbeddedFile).with_name("c:/textures/oak.PNG");
    assert!(registry.add_component(same, false).is_err());

    let fp = NameFingerprint::create_file_path("C:/Textures/Oak.png");
    assert!(registry.item_from_name_hash(ComponentType::EmbeddedFile, &fp).is_some());
}
