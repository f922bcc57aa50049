/// Input table file names, fixed by the point-of-sale export
pub const MASTERS_FILE: &str = "MenuItemMasters(in).csv";
pub const CLASSES_FILE: &str = "MenuItemClasses(in).csv";
pub const PRICES_FILE: &str = "MenuItemPrices(in).csv";
pub const DEFINITIONS_FILE: &str = "MenuItemDefinitions(in).csv";
pub const HIERARCHY_FILE: &str = "Hierarchy(in).csv";

// Default output artifact locations
pub const DEFAULT_ITEMS_JSON: &str = "processed/items_with_mods.json";
pub const DEFAULT_MODS_JSON: &str = "processed/modifiers.json";
pub const DEFAULT_MAP_CSV: &str = "processed/class_to_cg_map.csv";

/// Hierarchy (location) the catalog is built for unless configured otherwise
pub const DEFAULT_HIERARCHY_ID: i64 = 448;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.58;

/// Class codes in `[floor, ceiling)` are modifier groups; `code - floor` is the group id
pub const DEFAULT_MODIFIER_CLASS_FLOOR: i64 = 90_000;
pub const DEFAULT_MODIFIER_CLASS_CEILING: i64 = 100_000;

pub const DEFAULT_GROUP_HEADER_PREFIX: &str = "CG";

/// Header written to the class-to-group mapping table
pub const MAPPING_HEADER: [&str; 3] = ["class_object_number", "class_name", "cg_numbers"];

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "menu-catalog.log";
