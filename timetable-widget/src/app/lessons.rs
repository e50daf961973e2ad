use timetable_client::domain::Lesson;

/// Lessons shown at once; the rest collapse into an overflow line.
pub const VISIBLE_LESSON_LIMIT: usize = 5;

#[derive(Debug, PartialEq)]
pub struct VisibleLessons<'a> {
    pub lessons: Vec<&'a Lesson>,
    /// Lessons that passed the filter but did not fit.
    pub hidden: usize,
}

impl VisibleLessons<'_> {
    pub fn overflow_label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+{} more", self.hidden))
    }
}

/// Filter `items` by subgroup and cap the result.
pub fn visible_lessons(items: &[Lesson], group: u32) -> VisibleLessons<'_> {
    let mut matching = items.iter().filter(|lesson| lesson.matches_group(group));
    let lessons: Vec<&Lesson> = matching.by_ref().take(VISIBLE_LESSON_LIMIT).collect();
    let hidden = matching.count();
    VisibleLessons { lessons, hidden }
}
