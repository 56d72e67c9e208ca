pub mod video_presenter;

pub use video_presenter::present_video;
