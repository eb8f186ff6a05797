// goid-pm - package identity resolution for the goid build driver
// Vanity import discovery, case-fold collision checks, shared-library naming

pub mod foldcase;
pub mod importpath;
pub mod libname;
pub mod platform;
pub mod vanity;
pub mod workspace;

pub use foldcase::{check_case_collisions, fold_dup, CollisionError, FoldCollision, FoldKey};
pub use importpath::{common_path_prefix, has_path_prefix, is_local_import};
pub use libname::{base_name, libname, NamingError, SharedLibNamer};
pub use platform::{Platform, SharedLibStyle};
pub use vanity::{
    match_go_import, parse_meta_go_imports, parse_meta_go_imports_from, parse_with, HeadScan,
    ImportMatchError, ImportMeta, MetaScanner, ParseError, StrictScanner, TolerantScanner,
};
pub use workspace::{GopathWorkspace, NoWorkspace, WorkspaceContext};
