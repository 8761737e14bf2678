//! Question commands

use crate::context::Context;
use crate::output::emit;
use anyhow::Result;

/// `questions delete <ids...>`
pub async fn delete(ctx: &Context, ids: &[i64]) -> Result<()> {
    let envelope = ctx
        .client
        .categories(&ctx.auth)
        .batch_delete_questions(ids)
        .await?;
    emit(ctx.is_json(), envelope, |_| {})
}
