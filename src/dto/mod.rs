mod requests;
mod responses;

pub use requests::{LoginForm, PostForm, SearchParams, SignupForm, ValidForm};
pub use responses::{
    DEFAULT_PROFILE_IMAGE, DashboardView, FormView, HomeView, Navbar, PostView, ProfileView,
    SearchView,
};
