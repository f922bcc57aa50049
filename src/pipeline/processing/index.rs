use std::collections::HashMap;

use crate::domain::ItemClass;

/// Class attributes copied onto every catalog entry of that class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub object_number: i64,
    pub name: Option<String>,
    pub tax_class: Option<i64>,
    pub sales_itemizer: Option<i64>,
    pub discount_itemizer: Option<i64>,
}

impl From<(i64, &ItemClass)> for ClassRecord {
    fn from((object_number, class): (i64, &ItemClass)) -> Self {
        Self {
            object_number,
            name: class.name.as_deref().map(str::trim).map(str::to_string),
            tax_class: class.tax_class,
            sales_itemizer: class.sales_itemizer,
            discount_itemizer: class.discount_itemizer,
        }
    }
}

/// Lookup from class object number to class attributes. Built once from the
/// scoped classes; the first row wins when an object number repeats.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    records: Vec<ClassRecord>,
    by_object_number: HashMap<i64, usize>,
}

impl ClassIndex {
    pub fn build<'a>(classes: impl IntoIterator<Item = &'a ItemClass>) -> Self {
        let mut index = Self::default();
        for class in classes {
            let Some(object_number) = class.object_number else {
                continue;
            };
            if index.by_object_number.contains_key(&object_number) {
                continue;
            }
            index.by_object_number.insert(object_number, index.records.len());
            index.records.push(ClassRecord::from((object_number, class)));
        }
        index
    }

    pub fn get(&self, object_number: i64) -> Option<&ClassRecord> {
        self.by_object_number
            .get(&object_number)
            .map(|&i| &self.records[i])
    }

    pub fn contains(&self, object_number: i64) -> bool {
        self.by_object_number.contains_key(&object_number)
    }

    /// `(object number, name)` for every class that has a name, in table order
    pub fn named(&self) -> impl Iterator<Item = (i64, &str)> {
        self.records
            .iter()
            .filter_map(|r| r.name.as_deref().map(|name| (r.object_number, name)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
