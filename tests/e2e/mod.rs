//! Live end-to-end flows

mod project_creation_flow;
