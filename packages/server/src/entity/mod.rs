pub mod additional_discussion_file;
pub mod app_user;
pub mod course;
pub mod discussion;
pub mod discussion_file;
pub mod material;
pub mod material_file;
pub mod quiz;
pub mod quiz_answer;
pub mod quiz_question;
pub mod quiz_result;
pub mod simplify_material;
