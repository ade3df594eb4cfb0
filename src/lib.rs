pub mod group;
pub mod router;
pub mod static_files;

pub use group::RouteGroup;
pub use router::{
    clean_path,
    Dispatch,
    InsertError,
    Lookup,
    Node,
    Param,
    Params,
    Router,
    RouterConfig,
};
pub use static_files::StaticFiles;
