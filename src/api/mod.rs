pub mod images;
pub mod parse;
pub mod presets;

pub use images::{
    __path_handle_delete, __path_handle_download, __path_handle_get_session, __path_handle_grade, __path_handle_reset,
    __path_handle_retouch, __path_handle_upload,
};
pub use images::{
    handle_delete, handle_download, handle_get_session, handle_grade, handle_reset, handle_retouch,
    handle_upload, AdjustmentEntry, DownloadQuery, GradeBody, GradeResponse, RetouchBody,
    RetouchResponse, SessionSummary, UploadResponse,
};
pub use parse::{handle_parse, ParseBody, ParseResponse, __path_handle_parse};
pub use presets::{handle_list_presets, __path_handle_list_presets};
