use anyhow::Result;
use menu_catalog::constants::{CLASSES_FILE, DEFINITIONS_FILE, HIERARCHY_FILE, MASTERS_FILE, PRICES_FILE};
use menu_catalog::{CatalogConfig, CatalogError, CatalogPipeline, MenuContext};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const MASTERS: &str = "\
Id,MajorGroup,FamilyGroup,MasterName,MenuItemName
7,1,Tacos,Street Tacos,Al Pastor Taco
";

const CLASSES: &str = "\
ObjectNumber,Name,TaxClass,SalesItemizer,DiscountItemizer,HierarchyId
10,Tacos,1,1,1,448
11,Burritos,1,1,1,448
12,Drinks,2,2,1,448
13,Taco Plates,1,1,1,448
10,Tacos Elsewhere,1,1,1,500
";

const DEFINITIONS: &str = "\
Id,FirstName,MenuItemClass,MenuItemMasterId
1,Al Pastor Taco,10,7
2,Bean Burrito,11,
3,Horchata,12,999
4,Mystery Item,55,
100,Salsa Verde,90005,
101,Salsa Roja,90005,
102,Extra Cheese,90006,
900,CG 5 *Tacos*,90005,
901,CG 6 *Burritos*,90006,
902,CG 7 [drink sizes],90007,
5,Unpriced Taco,10,
6,Taco Plate Combo,13,
";

const PRICES: &str = "\
MenuItemDefID,HierarchyId,Price,MenuLevel,PriceSequence,TaxClass
1,448,3.5,1,1,1
1,448,3.5,1,1,1
1,448,4.0,2,1,1
2,448,8.0,1,1,1
3,448,2.5,1,1,2
4,448,1.0,1,1,1
100,448,0.0,1,1,1
101,448,0.5,1,1,1
102,448,1.0,1,1,1
900,448,0.0,1,1,1
6,448,11.0,1,1,1
1,500,9.0,1,1,1
";

const HIERARCHY: &str = "\
Id,Name
448,Airport
";

fn write_tables(dir: &Path) -> Result<()> {
    fs::write(dir.join(MASTERS_FILE), MASTERS)?;
    fs::write(dir.join(CLASSES_FILE), CLASSES)?;
    fs::write(dir.join(DEFINITIONS_FILE), DEFINITIONS)?;
    fs::write(dir.join(PRICES_FILE), PRICES)?;
    fs::write(dir.join(HIERARCHY_FILE), HIERARCHY)?;
    Ok(())
}

fn config_for(data: &TempDir, out: &Path) -> CatalogConfig {
    CatalogConfig {
        data_dir: data.path().to_path_buf(),
        out_items_json: out.join("items.json"),
        out_mods_json: out.join("mods.json"),
        out_map_csv: out.join("map.csv"),
        ..CatalogConfig::default()
    }
}

fn read_json(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn test_full_build_produces_nested_catalog() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());

    let summary = CatalogPipeline::new(config.clone())?.run()?;
    assert!(summary.hierarchy_known);
    assert_eq!(summary.definitions_in_scope, 9);
    assert_eq!(summary.stats.items, 4);
    assert_eq!(summary.stats.modifiers, 3);
    assert_eq!(summary.stats.group_headers, 1);
    assert_eq!(summary.stats.dropped, 1);

    let items = read_json(&config.out_items_json)?;
    let items = items.as_array().unwrap();
    let ids: Vec<i64> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 6]);

    let taco = &items[0];
    assert_eq!(taco["class_name"], "Tacos");
    assert_eq!(taco["prices"].as_array().unwrap().len(), 2);
    assert_eq!(taco["master_name"], "Street Tacos");
    assert_eq!(taco["major_group"], 1);
    let groups = taco["modifier_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["cg_number"], 5);
    assert_eq!(groups[0]["group_name"], "Tacos");
    let modifier_names: Vec<&str> = groups[0]["modifiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(modifier_names, vec!["Salsa Verde", "Salsa Roja"]);

    let horchata = &items[2];
    assert_eq!(horchata["modifier_groups"][0]["group_name"], "Drink Sizes");
    for field in ["major_group", "family_group", "master_name", "menu_item_name"] {
        assert!(horchata[field].is_null(), "{field} should be null");
    }

    let modifiers = read_json(&config.out_mods_json)?;
    let modifier_ids: Vec<i64> = modifiers
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(modifier_ids, vec![100, 101, 102]);

    let mapping = fs::read_to_string(&config.out_map_csv)?;
    assert_eq!(
        mapping,
        "class_object_number,class_name,cg_numbers\n\
         11,Burritos,6\n\
         12,Drinks,7\n\
         13,Taco Plates,5\n\
         10,Tacos,5\n"
    );
    Ok(())
}

#[test]
fn test_group_shared_by_two_classes_appears_in_both() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());
    CatalogPipeline::new(config.clone())?.run()?;

    let items = read_json(&config.out_items_json)?;
    let taco_group = &items[0]["modifier_groups"][0];
    let plate_group = &items[3]["modifier_groups"][0];
    assert_eq!(items[3]["name"], "Taco Plate Combo");
    assert_eq!(taco_group, plate_group);
    assert_eq!(plate_group["modifiers"][1]["prices"][0]["price"], 0.5);
    Ok(())
}

#[test]
fn test_runs_are_byte_identical() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let first_out = tempdir()?;
    let second_out = tempdir()?;
    let first = config_for(&data, first_out.path());
    let second = config_for(&data, second_out.path());

    let a = CatalogPipeline::new(first.clone())?.run()?;
    let b = CatalogPipeline::new(second.clone())?.run()?;

    assert_eq!(a.digests, b.digests);
    assert_eq!(fs::read(&first.out_items_json)?, fs::read(&second.out_items_json)?);
    assert_eq!(fs::read(&first.out_mods_json)?, fs::read(&second.out_mods_json)?);
    assert_eq!(fs::read(&first.out_map_csv)?, fs::read(&second.out_map_csv)?);
    Ok(())
}

#[test]
fn test_empty_scope_writes_empty_artifacts() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let out = tempdir()?;
    let config = CatalogConfig { hierarchy_id: 12345, ..config_for(&data, out.path()) };

    let summary = CatalogPipeline::new(config.clone())?.run()?;
    assert!(!summary.hierarchy_known);
    assert_eq!(fs::read_to_string(&config.out_items_json)?, "[]");
    assert_eq!(fs::read_to_string(&config.out_mods_json)?, "[]");
    assert_eq!(
        fs::read_to_string(&config.out_map_csv)?,
        "class_object_number,class_name,cg_numbers\n"
    );
    Ok(())
}

#[test]
fn test_strict_threshold_keeps_only_exact_matches() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let out = tempdir()?;
    let config = CatalogConfig { fuzzy_threshold: 1.0, ..config_for(&data, out.path()) };

    let summary = CatalogPipeline::new(config.clone())?.run()?;
    assert_eq!(summary.association_count, 2);
    let mapping = fs::read_to_string(&config.out_map_csv)?;
    assert_eq!(
        mapping,
        "class_object_number,class_name,cg_numbers\n11,Burritos,6\n10,Tacos,5\n"
    );
    Ok(())
}

#[test]
fn test_bad_rows_outside_the_joins_do_not_stop_the_build() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    fs::write(data.path().join(MASTERS_FILE), format!("{MASTERS},,,,\n"))?;
    fs::write(
        data.path().join(CLASSES_FILE),
        format!("{CLASSES}N/A,Catering,1,1,1,500\n14,Kids Menu\n"),
    )?;
    fs::write(data.path().join(PRICES_FILE), format!("{PRICES}2,448,three,1,1,1\n"))?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());

    let summary = CatalogPipeline::new(config.clone())?.run()?;
    assert_eq!(summary.stats.items, 4);
    assert_eq!(summary.stats.modifiers, 3);

    let items = read_json(&config.out_items_json)?;
    assert_eq!(items[0]["master_name"], "Street Tacos");
    let burrito_prices = items[1]["prices"].as_array().unwrap();
    assert_eq!(burrito_prices.len(), 2);
    assert!(burrito_prices[1]["price"].is_null());
    Ok(())
}

#[test]
fn test_missing_table_is_fatal_and_writes_nothing() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    fs::remove_file(data.path().join(HIERARCHY_FILE))?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());

    let err = CatalogPipeline::new(config.clone())?.run().unwrap_err();
    match &err {
        CatalogError::Load { path, .. } => assert!(path.ends_with(HIERARCHY_FILE)),
        other => panic!("expected a load error, got {other}"),
    }
    assert!(err.to_string().contains(HIERARCHY_FILE));
    assert!(!config.out_items_json.exists());
    assert!(!config.out_mods_json.exists());
    assert!(!config.out_map_csv.exists());
    Ok(())
}

#[test]
fn test_latin1_and_bom_exports_load() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let mut definitions = b"\xEF\xBB\xBF".to_vec();
    definitions.extend_from_slice(DEFINITIONS.as_bytes());
    fs::write(data.path().join(DEFINITIONS_FILE), definitions)?;
    let mut masters = MASTERS.as_bytes().to_vec();
    masters.extend_from_slice(b"8,2,Drinks,Agua Fresca,Pi\xF1a\n");
    fs::write(data.path().join(MASTERS_FILE), masters)?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());

    let summary = CatalogPipeline::new(config)?.run()?;
    assert_eq!(summary.stats.items, 4);
    Ok(())
}

#[test]
fn test_invalid_settings_are_rejected_before_loading() {
    let config = CatalogConfig { fuzzy_threshold: -0.1, ..CatalogConfig::default() };
    assert!(matches!(CatalogPipeline::new(config), Err(CatalogError::Config(_))));
}

#[test]
fn test_built_items_load_as_menu() -> Result<()> {
    let data = tempdir()?;
    write_tables(data.path())?;
    let out = tempdir()?;
    let config = config_for(&data, out.path());
    CatalogPipeline::new(config.clone())?.run()?;

    let menu = MenuContext::load(&config.out_items_json)?;
    assert_eq!(menu.len(), 4);
    assert_eq!(menu.item(1).unwrap().name, "Al Pastor Taco");
    assert_eq!(menu.find_by_name("horchata").len(), 1);
    assert_eq!(menu.group_count(), 4);
    Ok(())
}
