//! Assembles a [`WageQuery`] into the single named-column row the artifact was trained on.

use std::collections::HashSet;

use wage_inference::FeatureRow;

use crate::models::{
    Education, Health, HealthIns, JobClass, MaritalStatus, Race, Schema, WageQuery,
};

/// Column layout: numeric columns first, then one-hot blocks in field order,
/// then zero-valued placeholder columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    schema: Schema,
    placeholders: Vec<String>,
}

impl FeatureLayout {
    pub fn new(schema: Schema, placeholders: Vec<String>) -> Self {
        Self {
            schema,
            placeholders,
        }
    }

    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec!["age".to_string()];
        if self.schema == Schema::Extended {
            cols.push("year".to_string());
        }
        cols.extend(Education::ALL.iter().map(|v| v.column()));
        cols.extend(JobClass::ALL.iter().map(|v| v.column()));
        cols.extend(Health::ALL.iter().map(|v| v.column()));
        cols.extend(HealthIns::ALL.iter().map(|v| v.column()));
        if self.schema == Schema::Extended {
            cols.extend(MaritalStatus::ALL.iter().map(|v| v.column()));
            cols.extend(Race::ALL.iter().map(|v| v.column()));
        }
        cols.extend(self.placeholders.iter().cloned());
        cols
    }

    /// Placeholder names must be unique and must not shadow an assembled column.
    pub fn check_placeholders(&self) -> Result<(), String> {
        let assembled = FeatureLayout::new(self.schema, Vec::new()).columns();
        let mut seen = HashSet::new();
        for name in &self.placeholders {
            if assembled.contains(name) {
                return Err(format!(
                    "placeholder `{name}` collides with a column of the {} schema",
                    self.schema
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("placeholder `{name}` is listed twice"));
            }
        }
        Ok(())
    }

    /// Builds the row for `query`. Fails if the schema needs a field the query lacks.
    pub fn assemble(&self, query: &WageQuery) -> Result<FeatureRow, String> {
        let mut row = FeatureRow::with_capacity(self.placeholders.len() + 32);
        row.push("age", query.age as f32);

        if self.schema == Schema::Extended {
            let year = query.year.ok_or("missing field: year")?;
            row.push("year", year as f32);
        }

        one_hot(&mut row, Education::ALL, query.education, Education::column);
        one_hot(&mut row, JobClass::ALL, query.jobclass, JobClass::column);
        one_hot(&mut row, Health::ALL, query.health, Health::column);
        one_hot(&mut row, HealthIns::ALL, query.health_ins, HealthIns::column);

        if self.schema == Schema::Extended {
            let maritl = query.maritl.ok_or("missing field: maritl")?;
            let race = query.race.ok_or("missing field: race")?;
            one_hot(&mut row, MaritalStatus::ALL, maritl, MaritalStatus::column);
            one_hot(&mut row, Race::ALL, race, Race::column);
        }

        for name in &self.placeholders {
            if row.get(name).is_some() {
                return Err(format!("placeholder `{name}` collides with an assembled column"));
            }
            row.push(name.as_str(), 0.0);
        }

        Ok(row)
    }
}

fn one_hot<T: Copy + PartialEq>(
    row: &mut FeatureRow,
    levels: &[T],
    selected: T,
    column: fn(T) -> String,
) {
    for &level in levels {
        row.push(column(level), if level == selected { 1.0 } else { 0.0 });
    }
}
