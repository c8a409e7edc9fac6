//! Contract Invariant Tests
//!
//! These tests verify the guarantees the two encodings rely on.

use tileforge_core::{
    definition::DefinitionKind,
    diagnostics::DiagnosticKind,
    encode::{encode_client, encode_server},
    families::{structure_item, wall_parts, TileSheet},
    resource::{DepthMap, PlanemapExtractor, RasterHandle, TileTable},
    shape::{CellTag, Shape, Side},
    BlockBuilder, CompileError, Diagnostics, ItemBuilder, MergePolicy, Prototype, Registry, StructureBuilder,
    StructurePrototype, resolve,
};

fn wood_sheet() -> TileSheet<'static> {
    TileSheet::new(
        RasterHandle::new("structures/wood_wall.png"),
        Some(RasterHandle::new("structures/wood_wall-planemap.png")),
        &PlanemapExtractor,
    )
}

fn tile_table() -> TileTable {
    let mut tiles = TileTable::new();
    for name in ["grass", "dirt", "sand", "water"] {
        tiles.insert(name, RasterHandle::new("terrain/tiles.png"));
    }
    tiles
}

fn lamp() -> StructurePrototype {
    let mut p = StructurePrototype::default();
    p.set_name("lamp".to_string());
    p.image(RasterHandle::new("s.png").crop(0, 0, 32, 64).unwrap())
        .model(DepthMap::Flat { width: 32, height: 64 })
        .shape(Shape::unit())
        .light([16, 16, 32], [255, 200, 120], 120);
    p
}

#[test]
fn invariant_instantiate_is_idempotent() {
    let mut diags = Diagnostics::new();
    let p = lamp();
    let a = p.instantiate(&mut diags).unwrap();
    let b = p.instantiate(&mut diags).unwrap();
    assert_eq!(a, b);
    assert!(diags.is_empty());
}

#[test]
fn invariant_image_xor_animation() {
    let mut neither = lamp();
    neither.image.clear();

    let mut both = lamp();
    both.anim(vec![RasterHandle::new("a")], 2, false);

    let mut anim_only = lamp();
    anim_only.image.clear();
    anim_only.anim(vec![RasterHandle::new("a")], 2, true);

    for p in [&neither, &both] {
        let mut diags = Diagnostics::new();
        assert!(p.instantiate(&mut diags).is_none());
        let d = diags.of_kind(DiagnosticKind::AmbiguousVariant).next().unwrap();
        assert_eq!(d.fields, vec!["image".to_string(), "anim_frames".to_string()]);
    }

    let mut diags = Diagnostics::new();
    assert!(lamp().instantiate(&mut diags).is_some());
    assert!(anim_only.instantiate(&mut diags).is_some());
    assert!(diags.is_empty());
}

#[test]
fn invariant_light_group_all_or_nothing() {
    let mut none = lamp();
    none.light_offset.clear();
    none.light_color.clear();
    none.light_radius.clear();

    let mut diags = Diagnostics::new();
    let def = none.instantiate(&mut diags).unwrap();
    assert_eq!(def.as_structure().unwrap().light, None);
    let def = lamp().instantiate(&mut diags).unwrap();
    assert_eq!(def.as_structure().unwrap().light.unwrap().radius, 120);
    assert!(diags.is_empty());

    let mut one = none.clone();
    one.light_radius.set(10);
    let mut two = one.clone();
    two.light_color.set([1, 2, 3]);

    for p in [&one, &two] {
        let mut diags = Diagnostics::new();
        assert!(p.instantiate(&mut diags).is_none());
        assert_eq!(diags.of_kind(DiagnosticKind::IncoherentGroup).count(), 1);
    }
}

#[test]
fn invariant_merge_sizes_and_collisions() {
    let mut diags = Diagnostics::new();
    let wood = wall_parts("wood_wall", &wood_sheet(), true).unwrap().build(&mut diags).unwrap();
    let stone = wall_parts("stone_wall", &wood_sheet(), false).unwrap().build(&mut diags).unwrap();
    let (a, b) = (wood.len(), stone.len());

    let mut merged = Registry::new();
    merged.merge(wood.clone(), MergePolicy::Reject).unwrap();
    merged.merge(stone, MergePolicy::Reject).unwrap();
    assert_eq!(merged.len(), a + b);

    let mut clash = StructureBuilder::new();
    clash.push(lamp()).set_name("wood_wall/cross".to_string());
    let clash = clash.build(&mut diags).unwrap();
    let err = merged.merge(clash, MergePolicy::Reject).unwrap_err();
    assert!(matches!(
        err,
        CompileError::NameCollision { ref name, kind: DefinitionKind::Structure } if name == "wood_wall/cross"
    ));
    assert_eq!(merged.len(), a + b);
    assert!(diags.is_empty());
}

#[test]
fn invariant_ids_deterministic() {
    let build = || {
        let mut diags = Diagnostics::new();
        let mut registry = Registry::new();
        registry
            .merge_builder(wall_parts("wood_wall", &wood_sheet(), true).unwrap(), &mut diags)
            .unwrap();
        let mut blocks = BlockBuilder::new();
        blocks.create("grass").side(Side::Top, "grass");
        blocks.create("sand").side(Side::Top, "sand");
        registry.merge_builder(blocks, &mut diags).unwrap();
        let ids = resolve(&registry, &tile_table(), &mut diags);
        (registry, ids)
    };

    let (r1, ids1) = build();
    let (_, ids2) = build();
    assert_eq!(ids1, ids2);

    for kind in [DefinitionKind::Structure, DefinitionKind::Block] {
        let names: Vec<_> = ids1.iter(kind).map(|(n, _)| n).collect();
        let registry_order: Vec<_> = r1.iter().filter(|d| d.kind() == kind).map(|d| d.name()).collect();
        assert_eq!(names, registry_order);
    }
    assert_eq!(ids1.id_of(DefinitionKind::Structure, "wood_wall/door"), Some(12));
    assert_eq!(ids1.id_of(DefinitionKind::Block, "sand"), Some(1));
}

#[test]
fn invariant_client_index_is_id() {
    let mut diags = Diagnostics::new();
    let mut registry = Registry::new();
    registry
        .merge_builder(wall_parts("wood_wall", &wood_sheet(), true).unwrap(), &mut diags)
        .unwrap();
    let ids = resolve(&registry, &tile_table(), &mut diags);

    let client = encode_client(&registry, &ids);
    let server = encode_server(&registry);
    assert_eq!(ids.count(DefinitionKind::Item), 0);
    for (name, id) in ids.iter(DefinitionKind::Structure) {
        assert_eq!(server.structures[id as usize].name, name);
    }
    assert_eq!(client.structures.len(), server.structures.len());
}

#[test]
fn scenario_wood_wall_family() {
    let mut diags = Diagnostics::new();
    let mut registry = Registry::new();
    registry
        .merge_builder(wall_parts("wood_wall", &wood_sheet(), true).unwrap(), &mut diags)
        .unwrap();

    assert!(diags.is_empty());
    assert_eq!(registry.len(), 13);
    assert!(registry.iter().all(|d| d.name().starts_with("wood_wall/")));

    for def in registry.iter() {
        let s = def.as_structure().unwrap();
        if def.name() == "wood_wall/door" {
            assert_eq!(s.shape.size, [3, 1, 2]);
            assert_eq!(
                s.shape.cells,
                vec![CellTag::Solid, CellTag::Floor, CellTag::Solid, CellTag::Solid, CellTag::Empty, CellTag::Solid]
            );
        } else {
            assert_eq!(s.shape.size, [1, 1, 2]);
        }
    }

    // derived assets can read finalized definitions back by name
    let edge = registry[(DefinitionKind::Structure, "wood_wall/edge/horiz")].as_structure().unwrap();
    assert_eq!(edge.layer, 1);
}

#[test]
fn scenario_items_named_after_their_parts() {
    let mut diags = Diagnostics::new();
    let mut registry = Registry::new();
    registry
        .merge_builder(wall_parts("wood_wall", &wood_sheet(), true).unwrap(), &mut diags)
        .unwrap();

    let mut items = ItemBuilder::new();
    let parts = [("edge/horiz", "side"), ("corner/nw", "corner"), ("tee/e", "tee"), ("cross", "cross")];
    for (part, item) in parts {
        let structure = registry.structure(&format!("wood_wall/{}", part)).unwrap();
        let name = format!("wood_wall/{}", item);
        items.merge(structure_item(structure, &name, item, (0, 0), 32).unwrap()).unwrap();
    }
    registry.merge_builder(items, &mut diags).unwrap();

    let names = parts.map(|(_, item)| format!("wood_wall/{}", item));
    registry.attach_recipe(names.iter().map(String::as_str), "anvil", [("wood", 5)]).unwrap();

    assert!(diags.is_empty());
    assert_eq!(registry.len(), 17);
    assert!(registry.structure("wood_wall/cross").is_some());
    for name in &names {
        assert_eq!(registry.item(name).unwrap().recipe.as_ref().unwrap().inputs["wood"], 5);
    }

    let ids = resolve(&registry, &tile_table(), &mut diags);
    assert_eq!(ids.id_of(DefinitionKind::Structure, "wood_wall/cross"), Some(11));
    assert_eq!(ids.id_of(DefinitionKind::Item, "wood_wall/cross"), Some(3));
}

#[test]
fn scenario_unresolved_block_side() {
    let mut diags = Diagnostics::new();
    let mut blocks = BlockBuilder::new();
    blocks
        .create("meadow")
        .side(Side::Top, "grass")
        .side(Side::Bottom, "dirt")
        .side(Side::North, "stone")
        .side(Side::South, "sand")
        .side(Side::East, "grass")
        .side(Side::West, "water");

    let mut registry = Registry::new();
    registry.merge_builder(blocks, &mut diags).unwrap();
    let ids = resolve(&registry, &tile_table(), &mut diags);

    let unresolved: Vec<_> = diags.of_kind(DiagnosticKind::UnresolvedReference).collect();
    assert_eq!(diags.len(), 1);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].subject, "meadow");
    assert_eq!(unresolved[0].fields, vec!["north".to_string()]);
    assert_eq!(unresolved[0].reference.as_deref(), Some("stone"));

    let client = serde_json::to_value(encode_client(&registry, &ids)).unwrap();
    let record = client["blocks"][0].as_object().unwrap();
    assert!(!record.contains_key("north"));
    for side in ["top", "bottom", "south", "east", "west"] {
        assert!(record[side].is_u64(), "side {} should be an integer", side);
    }
    assert_eq!(record["top"], 0);
    assert_eq!(record["west"], 3);

    let server = serde_json::to_value(encode_server(&registry)).unwrap();
    let record = server["blocks"][0].as_object().unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(record["name"], "meadow");
    assert_eq!(record["shape"], "solid");

    assert!(matches!(diags.finish(), Err(CompileError::Diagnostics(all)) if all.len() == 1));
}
