use crate::commands::CmdResult;
use crate::routes::resolve_detail_route;

pub fn run(category: &str, id: &str) -> CmdResult {
    CmdResult::default().with_route(resolve_detail_route(category, id))
}
