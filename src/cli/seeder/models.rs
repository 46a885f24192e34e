use cohort_models::{CourseCode, InstructorId, StudentId};

/// Marks every row the seeder creates so `clear-seed` can find it again.
pub const SEED_EMAIL_DOMAIN: &str = "seed.cohort.test";
pub const SEED_STUDENT_CODE_PREFIX: &str = "SEED-";
pub const SEED_COURSE_CODE_PREFIX: &str = "SD";
pub const SEED_GROUP_PREFIX: &str = "Seed ";

pub struct InstructorSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialty: String,
}

pub struct CourseSeed {
    pub code: CourseCode,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: Option<InstructorId>,
}

pub struct StudentSeed {
    pub enrollment_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub struct GroupSeed {
    pub name: String,
    pub course_codes: Vec<CourseCode>,
    pub student_ids: Vec<StudentId>,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub instructors: usize,
    pub courses: usize,
    pub students: usize,
    pub groups: usize,
    pub courses_per_group: usize,
    pub students_per_group: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            instructors: 10,
            courses: 20,
            students: 200,
            groups: 8,
            courses_per_group: 4,
            students_per_group: 30,
        }
    }
}

impl SeedConfig {
    /// Course codes are `SD` plus three digits.
    pub const MAX_COURSES: usize = 999;

    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    /// Clamps per-group counts to what the catalog and roster can supply.
    pub fn normalized(mut self) -> Self {
        self.courses = self.courses.min(Self::MAX_COURSES);
        self.courses_per_group = self.courses_per_group.min(self.courses);
        self.students_per_group = self.students_per_group.min(self.students);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_group_sizes() {
        let config = SeedConfig {
            instructors: 1,
            courses: 2,
            students: 5,
            groups: 1,
            courses_per_group: 10,
            students_per_group: 50,
        }
        .normalized();

        assert_eq!(config.courses_per_group, 2);
        assert_eq!(config.students_per_group, 5);
    }

    #[test]
    fn test_normalized_caps_course_count() {
        let config = SeedConfig {
            courses: 5000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.courses, SeedConfig::MAX_COURSES);
    }
}
