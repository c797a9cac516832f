#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, str::FromStr};

use crate::error::GradeError;

/// Educational level of the student who wrote the essay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradeLevel {
    /// Kindergarten through 2nd grade.
    #[default]
    ElementaryK2,
    /// 3rd through 5th grade.
    Elementary3To5,
    /// 6th through 8th grade.
    MiddleSchool,
    /// 9th and 10th grade.
    HighSchool9To10,
    /// 11th and 12th grade.
    HighSchool11To12,
    /// First and second year undergraduates.
    CollegeLower,
    /// Third and fourth year undergraduates.
    CollegeUpper,
    /// Graduate students.
    Graduate,
}

impl GradeLevel {
    /// Every level, in the order they are offered in the form.
    pub const ALL: [GradeLevel; 8] = [
        GradeLevel::ElementaryK2,
        GradeLevel::Elementary3To5,
        GradeLevel::MiddleSchool,
        GradeLevel::HighSchool9To10,
        GradeLevel::HighSchool11To12,
        GradeLevel::CollegeLower,
        GradeLevel::CollegeUpper,
        GradeLevel::Graduate,
    ];

    /// Label shown in the form and written into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::ElementaryK2 => "Elementary School (K-2)",
            GradeLevel::Elementary3To5 => "Elementary School (3-5)",
            GradeLevel::MiddleSchool => "Middle School (6-8)",
            GradeLevel::HighSchool9To10 => "High School (9-10)",
            GradeLevel::HighSchool11To12 => "High School (11-12)",
            GradeLevel::CollegeLower => "College Freshman/Sophomore",
            GradeLevel::CollegeUpper => "College Junior/Senior",
            GradeLevel::Graduate => "Graduate Level",
        }
    }

    /// Writing expectations for students at this level.
    pub fn expectations(self) -> &'static str {
        match self {
            GradeLevel::ElementaryK2 => include_str!("prompts/grade_levels/elementary_k2.md"),
            GradeLevel::Elementary3To5 => include_str!("prompts/grade_levels/elementary_3_5.md"),
            GradeLevel::MiddleSchool => include_str!("prompts/grade_levels/middle_school.md"),
            GradeLevel::HighSchool9To10 => {
                include_str!("prompts/grade_levels/high_school_9_10.md")
            }
            GradeLevel::HighSchool11To12 => {
                include_str!("prompts/grade_levels/high_school_11_12.md")
            }
            GradeLevel::CollegeLower => include_str!("prompts/grade_levels/college_lower.md"),
            GradeLevel::CollegeUpper => include_str!("prompts/grade_levels/college_upper.md"),
            GradeLevel::Graduate => include_str!("prompts/grade_levels/graduate.md"),
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GradeLevel {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        GradeLevel::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| GradeError::UnknownGradeLevel(s.to_string()))
    }
}
