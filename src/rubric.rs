#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bon::Builder;

/// A single weighted rubric criterion.
///
/// The weight is only a hint rendered into the prompt; it is never
/// normalized or checked against the other weights.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct RubricCriterion {
    /// Short name of the criterion, e.g. `Organization`.
    pub name:        String,
    /// Relative weight (usually points out of 100).
    pub weight:      f64,
    /// What the grader should look for.
    pub description: String,
}

impl RubricCriterion {
    /// Creates a criterion from its three parts.
    pub fn new(name: impl Into<String>, weight: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
        }
    }

    /// Weight formatted without a trailing `.0` for whole numbers.
    pub fn weight_label(&self) -> String {
        format_weight(self.weight)
    }
}

/// An ordered list of rubric criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rubric {
    /// Criteria in the order they should be presented to the model.
    criteria: Vec<RubricCriterion>,
}

impl Rubric {
    /// Creates a rubric from criteria, keeping their order.
    pub fn new(criteria: Vec<RubricCriterion>) -> Self {
        Self { criteria }
    }

    /// The five-criterion essay rubric offered when the form first loads.
    pub fn essay_default() -> Self {
        Self::new(vec![
            RubricCriterion::new(
                "Content",
                30.0,
                "Evaluate the depth, relevance, and accuracy of the essay content.",
            ),
            RubricCriterion::new(
                "Organization",
                20.0,
                "Assess structure, flow, and logical progression of ideas.",
            ),
            RubricCriterion::new(
                "Language & Style",
                20.0,
                "Assess clarity, vocabulary, sentence variety, and tone.",
            ),
            RubricCriterion::new(
                "Grammar & Mechanics",
                20.0,
                "Evaluate grammar, spelling, punctuation, and adherence to writing conventions.",
            ),
            RubricCriterion::new(
                "Critical Thinking",
                10.0,
                "Assess analytical depth, originality, and insights.",
            ),
        ])
    }

    /// Returns the criteria in order.
    pub fn criteria(&self) -> &[RubricCriterion] {
        &self.criteria
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// True when there are no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Appends a placeholder criterion numbered after the current count.
    pub fn push_placeholder(&mut self) {
        let n = self.criteria.len() + 1;
        self.criteria.push(RubricCriterion::new(
            format!("New Criterion {n}"),
            10.0,
            "Description",
        ));
    }

    /// Drops the last criterion unless it is the only one left.
    pub fn remove_last(&mut self) -> Option<RubricCriterion> {
        if self.criteria.len() > 1 {
            self.criteria.pop()
        } else {
            None
        }
    }

    /// Iterates over the criteria.
    pub fn iter(&self) -> std::slice::Iter<'_, RubricCriterion> {
        self.criteria.iter()
    }
}

impl From<Vec<RubricCriterion>> for Rubric {
    fn from(criteria: Vec<RubricCriterion>) -> Self {
        Self::new(criteria)
    }
}

impl FromIterator<RubricCriterion> for Rubric {
    fn from_iter<I: IntoIterator<Item = RubricCriterion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Rubric {
    type IntoIter = std::slice::Iter<'a, RubricCriterion>;
    type Item = &'a RubricCriterion;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

/// Formats a weight, dropping the fractional part when it is zero.
pub(crate) fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.is_finite() {
        format!("{}", weight as i64)
    } else {
        format!("{weight}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rubric_has_five_criteria_in_order() {
        let rubric = Rubric::essay_default();
        let names: Vec<_> = rubric.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Content", "Organization", "Language & Style", "Grammar & Mechanics", "Critical Thinking"]
        );
    }

    #[test]
    fn placeholder_is_numbered_after_existing_criteria() {
        let mut rubric = Rubric::essay_default();
        rubric.push_placeholder();
        assert_eq!(rubric.len(), 6);
        assert_eq!(rubric.criteria()[5].name, "New Criterion 6");
        assert_eq!(rubric.criteria()[5].description, "Description");
    }

    #[test]
    fn remove_last_keeps_one_criterion() {
        let mut rubric = Rubric::new(vec![
            RubricCriterion::new("A", 50.0, "a"),
            RubricCriterion::new("B", 50.0, "b"),
        ]);
        assert_eq!(rubric.remove_last().map(|c| c.name), Some("B".to_string()));
        assert!(rubric.remove_last().is_none());
        assert_eq!(rubric.len(), 1);
    }

    #[test]
    fn weights_render_without_trailing_zero() {
        assert_eq!(format_weight(30.0), "30");
        assert_eq!(format_weight(12.5), "12.5");
        assert_eq!(format_weight(-5.0), "-5");
    }

    #[test]
    fn builder_accepts_str_fields() {
        let criterion = RubricCriterion::builder()
            .name("Argument")
            .weight(70.0)
            .description("strength of thesis")
            .build();
        assert_eq!(criterion, RubricCriterion::new("Argument", 70.0, "strength of thesis"));
    }
}
