mod content_pipeline;
mod helpers;
mod session_flow;
