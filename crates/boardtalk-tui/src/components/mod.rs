pub mod attachment_panel;
pub mod mention_picker;
pub mod task_list;
pub mod thread_view;
