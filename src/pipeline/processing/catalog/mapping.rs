use crate::domain::ClassGroupMapping;
use crate::pipeline::processing::association::ClassGroupAssociations;
use crate::pipeline::processing::index::ClassIndex;

/// One row per class with at least one group, sorted by class name and then
/// object number so equal names keep a stable order
pub fn class_group_mapping(
    associations: &ClassGroupAssociations,
    classes: &ClassIndex,
) -> Vec<ClassGroupMapping> {
    let mut rows: Vec<ClassGroupMapping> = associations
        .iter()
        .filter(|(_, groups)| !groups.is_empty())
        .map(|(object_number, groups)| ClassGroupMapping {
            class_object_number: object_number,
            class_name: classes
                .get(object_number)
                .and_then(|c| c.name.clone())
                .unwrap_or_default(),
            cg_numbers: groups
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then(a.class_object_number.cmp(&b.class_object_number))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::test_support::class;

    #[test]
    fn test_rows_sorted_by_name_with_ascending_groups() {
        let classes = vec![class(20, "Tacos", 448), class(10, "Drinks", 448), class(30, "Sides", 448)];
        let index = ClassIndex::build(&classes);
        let mut associations = ClassGroupAssociations::default();
        associations.insert(20, 12);
        associations.insert(20, 3);
        associations.insert(10, 7);

        let rows = class_group_mapping(&associations, &index);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].class_name, "Drinks");
        assert_eq!(rows[1].class_object_number, 20);
        assert_eq!(rows[1].cg_numbers, "3,12");
    }
}
