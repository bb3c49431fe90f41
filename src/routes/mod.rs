pub mod attendance;
pub mod course_assignments;
pub mod events;
pub mod grades;
pub mod messages;
pub mod notifications;
pub mod sanctions;
pub mod students;

pub use attendance::configure_attendance_routes;
pub use course_assignments::configure_course_assignment_routes;
pub use events::configure_event_routes;
pub use grades::configure_grade_routes;
pub use messages::configure_message_routes;
pub use notifications::configure_notification_routes;
pub use sanctions::configure_sanction_routes;
pub use students::configure_student_routes;

use actix_web::web;

/// Every API scope, in the order `main` and the integration tests mount them.
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    configure_attendance_routes(cfg);
    configure_notification_routes(cfg);
    configure_grade_routes(cfg);
    configure_sanction_routes(cfg);
    configure_event_routes(cfg);
    configure_message_routes(cfg);
    configure_course_assignment_routes(cfg);
    configure_student_routes(cfg);
}
