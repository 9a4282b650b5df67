use crate::core::assignment::Assignment;

/// Running counters over a set of assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    pub assignments: usize,
    pub assigned: usize,
    pub present: usize,
}

impl AttendanceTally {
    pub fn add(&mut self, assignment: &Assignment) {
        self.assignments += 1;
        self.assigned += assignment.assigned_count();
        self.present += assignment.present_count();
    }

    pub fn absent(&self) -> usize {
        self.assigned - self.present
    }

    pub fn rate(&self) -> String {
        attendance_rate(self.present, self.assigned)
    }
}

impl<'a> FromIterator<&'a Assignment> for AttendanceTally {
    fn from_iter<I: IntoIterator<Item = &'a Assignment>>(iter: I) -> Self {
        let mut tally = Self::default();
        for assignment in iter {
            tally.add(assignment);
        }
        tally
    }
}

/// Present over assigned as a percentage with two decimals, `"0%"` when nobody is assigned.
pub fn attendance_rate(present: usize, assigned: usize) -> String {
    if assigned == 0 {
        return "0%".to_string();
    }
    format!("{:.2}%", present as f64 * 100.0 / assigned as f64)
}
