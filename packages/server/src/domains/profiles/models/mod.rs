pub mod user_detail;

pub use user_detail::{
    Interest, InterestKind, PictureWithFile, ProfilePatch, ProfilePicture, UserDetail,
};
