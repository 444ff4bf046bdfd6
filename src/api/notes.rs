//! Project note endpoints.

use crate::Result;
use crate::model::Note;
use crate::module::Module;
use crate::notes::{self, NewNote, NoteUpdate};
use crate::procedure::{Deleted, Empty, Meta, Procedure};
use crate::router::{Context, Router};

const TAG: &str = "notes";

pub struct ListNotes;

impl Procedure for ListNotes {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/notes")
            .summary("Notes of a project, pinned first")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Note>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Note>> {
        ctx.actor().await?;
        notes::list(ctx.conn()?, ctx.require_param("id")?).await
    }
}

pub struct CreateNote;

impl Procedure for CreateNote {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/notes")
            .summary("Post a note (editors and above)")
            .tag(TAG)
            .status(201)
    }

    type Input = NewNote;
    type Output = Note;

    async fn handle(ctx: Context, input: NewNote) -> Result<Note> {
        let actor = ctx.actor().await?;
        notes::create(ctx.conn()?, &actor, ctx.require_param("id")?, input).await
    }
}

pub struct UpdateNote;

impl Procedure for UpdateNote {
    fn meta() -> Meta {
        Meta::patch("/api/projects/{id}/notes/{note_id}")
            .summary("Edit a note (author or owner)")
            .tag(TAG)
    }

    type Input = NoteUpdate;
    type Output = Note;

    async fn handle(ctx: Context, input: NoteUpdate) -> Result<Note> {
        let actor = ctx.actor().await?;
        notes::update(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("note_id")?,
            input,
        )
        .await
    }
}

pub struct DeleteNote;

impl Procedure for DeleteNote {
    fn meta() -> Meta {
        Meta::delete("/api/projects/{id}/notes/{note_id}")
            .summary("Delete a note (author or owner)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Deleted;

    async fn handle(ctx: Context, _input: Empty) -> Result<Deleted> {
        let actor = ctx.actor().await?;
        let note_id = ctx.require_param("note_id")?;
        notes::delete(ctx.conn()?, &actor, ctx.require_param("id")?, note_id).await?;
        Ok(Deleted::new(note_id))
    }
}

pub struct Notes;

impl Module for Notes {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<ListNotes>();
        router.procedure::<CreateNote>();
        router.procedure::<UpdateNote>();
        router.procedure::<DeleteNote>();
    }
}
