use meshroom_core::ParticipantId;

pub const ATTENDANCE_TITLE: &str = "Attendance List";

/// Renders the roster as a plain-text attendance document: the title, a blank
/// line, then one numbered line per participant in roster order.
pub fn render_attendance(participants: &[ParticipantId]) -> String {
    let mut doc = format!("{ATTENDANCE_TITLE}\n\n");
    for (index, id) in participants.iter().enumerate() {
        doc.push_str(&format!("{}. {}\n", index + 1, id));
    }
    doc
}
