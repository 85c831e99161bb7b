//! A line-oriented shell over [`App`].
//!
//! Each input line is parsed with clap into one [`Command`], executed against
//! a single [`Session`], and answered with plain text. Command failures are
//! printed and the loop carries on; only I/O errors end it early.

use clap::{Parser, Subcommand};
use sharelist_core::{
  id::{ItemId, ListId},
  item::Item,
  list::ListSummary,
  store::{Departure, ListStore},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};

use crate::{
  App,
  error::Result,
  session::{CurrentUser, Session},
};

#[derive(Parser, Debug)]
#[command(name = "sharelist", no_binary_name = true, disable_version_flag = true)]
pub struct Line {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
  /// Create an account.
  Register { username: String, password: String },
  /// Sign in, replacing any current sign-in.
  Login { username: String, password: String },
  Logout,
  /// Show who is signed in.
  Whoami,

  /// Create a list and select it.
  Create {
    #[arg(required = true)]
    name: Vec<String>,
  },
  /// Join a list by share code and select it.
  Join { code: String },
  /// Show the lists you belong to.
  Lists,
  /// Make a list the current one.
  Select { list: ListId },
  /// Show the current list.
  Info,
  /// Show the members of the current list.
  Members,
  /// Delete the current list (owner only).
  DeleteList,
  /// Leave the current list.
  Leave,

  /// Add an item to the current list.
  Add {
    #[arg(short, long)]
    category: Option<String>,
    #[arg(required = true)]
    name:     Vec<String>,
  },
  /// Put a suggested product back on the current list.
  AddSuggestion {
    #[arg(required = true)]
    name: Vec<String>,
  },
  /// Show the items still to buy.
  Items,
  /// Mark an item bought, or put it back.
  Toggle { item: ItemId },
  /// Delete an item.
  Remove { item: ItemId },
  /// Delete every item still to buy.
  Clear,
  /// Show the purchase log of the current list.
  History,
  /// Show the most frequently bought products.
  Suggest,
  /// Show the most recently bought product.
  Last,
  /// Show the quick category catalog.
  Categories,

  #[command(alias = "exit")]
  Quit,
}

/// What the shell should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
  Text(String),
  Quit,
}

fn summary_line(list: &ListSummary, current: Option<ListId>) -> String {
  let marker = if current == Some(list.id) { "*" } else { " " };
  format!(
    "{marker} {}  {}  owner: {}  code: {}",
    list.id, list.name, list.owner_name, list.share_code
  )
}

fn item_line(item: &Item) -> String {
  format!("{}  {}  [{}]", item.id, item.product_name, item.category)
}

/// Run one command against `session`.
pub async fn execute<S: ListStore>(
  app: &App<S>,
  session: &mut Session,
  command: Command,
) -> Result<Reply> {
  let text = match command {
    Command::Register { username, password } => {
      let user = app.register(&username, &password).await?;
      format!("registered {}", user.username)
    }
    Command::Login { username, password } => {
      let user = app.login(session, &username, &password).await?;
      format!("logged in as {}", user.username)
    }
    Command::Logout => {
      app.logout(session);
      "logged out".to_owned()
    }
    Command::Whoami => match app.current_user(session) {
      CurrentUser::User(user) => format!("{} (id {})", user.username, user.id),
      anonymous => anonymous.display_name().to_owned(),
    },

    Command::Create { name } => {
      let list = app.create_list(session, &name.join(" ")).await?;
      format!("created list {} \"{}\" (share code {})", list.id, list.name, list.share_code)
    }
    Command::Join { code } => {
      let list = app.join_list(session, &code).await?;
      format!("joined list {} \"{}\"", list.id, list.name)
    }
    Command::Lists => {
      let lists = app.lists(session).await?;
      if lists.is_empty() {
        "no lists".to_owned()
      } else {
        let current = session.current_list();
        lists
          .iter()
          .map(|list| summary_line(list, current))
          .collect::<Vec<_>>()
          .join("\n")
      }
    }
    Command::Select { list } => {
      let summary = app.select_list(session, list).await?;
      format!("selected list {} \"{}\"", summary.id, summary.name)
    }
    Command::Info => {
      let info = app.current_list_info(session).await?;
      format!(
        "list {}: {}\nowner: {}\nshare code: {}\ncreated: {}",
        info.id,
        info.name,
        info.owner_name,
        info.share_code,
        info.created_at.format("%Y-%m-%d %H:%M"),
      )
    }
    Command::Members => {
      let info = app.current_list_info(session).await?;
      let members = app.members_of(session, info.id).await?;
      members
        .iter()
        .map(|m| {
          let role = if m.user_id == info.owner_id { " (owner)" } else { "" };
          format!("{}{role}", m.username)
        })
        .collect::<Vec<_>>()
        .join("\n")
    }
    Command::DeleteList => {
      let list = session.require_list()?;
      app.delete_list(session, list).await?;
      format!("deleted list {list}")
    }
    Command::Leave => match app.leave_current_list(session).await? {
      Departure::Left => "left list".to_owned(),
      Departure::OwnershipTransferred { to } => {
        format!("left list; user {to} is the new owner")
      }
      Departure::ListDeleted => "left list; it had no other members and was deleted".to_owned(),
      Departure::NotMember => "not a member of that list".to_owned(),
    },

    Command::Add { category, name } => {
      let list = session.require_list()?;
      let item = app
        .add_item(session, list, &name.join(" "), category.as_deref())
        .await?;
      format!("added {}", item_line(&item))
    }
    Command::AddSuggestion { name } => {
      let list = session.require_list()?;
      let item = app.add_suggestion(session, list, &name.join(" ")).await?;
      format!("added {}", item_line(&item))
    }
    Command::Items => {
      let list = session.require_list()?;
      let items = app.active_items(session, list).await?;
      if items.is_empty() {
        "nothing to buy".to_owned()
      } else {
        items.iter().map(item_line).collect::<Vec<_>>().join("\n")
      }
    }
    Command::Toggle { item } => {
      let item = app.toggle_purchased(session, item).await?;
      if item.is_active() {
        format!("{} is back on the list", item.product_name)
      } else {
        format!("{} purchased", item.product_name)
      }
    }
    Command::Remove { item } => {
      app.delete_item(session, item).await?;
      format!("removed item {item}")
    }
    Command::Clear => {
      let list = session.require_list()?;
      let removed = app.clear_active_items(session, list).await?;
      format!("removed {removed} items")
    }
    Command::History => {
      let list = session.require_list()?;
      let history = app.history_for(session, list).await?;
      if history.is_empty() {
        "no purchases yet".to_owned()
      } else {
        history
          .iter()
          .map(|r| {
            format!(
              "{}  {}  [{}]  by {}",
              r.purchased_at.format("%Y-%m-%d %H:%M"),
              r.product_name,
              r.category,
              r.purchaser_name.as_deref().unwrap_or("unknown"),
            )
          })
          .collect::<Vec<_>>()
          .join("\n")
      }
    }
    Command::Suggest => {
      let list = session.require_list()?;
      let suggestions = app.suggestions_for(session, list).await?;
      if suggestions.is_empty() {
        "no suggestions yet".to_owned()
      } else {
        suggestions
          .iter()
          .map(|s| format!("{} ({}x)", s.product_name, s.count))
          .collect::<Vec<_>>()
          .join("\n")
      }
    }
    Command::Last => {
      let list = session.require_list()?;
      app
        .last_purchased(session, list)
        .await?
        .unwrap_or_else(|| "nothing purchased yet".to_owned())
    }
    Command::Categories => App::<S>::quick_categories().join(", "),

    Command::Quit => return Ok(Reply::Quit),
  };
  Ok(Reply::Text(text))
}

/// Read commands from `input` until it ends or a `quit` arrives, writing
/// every reply to `output`.
pub async fn run<S, R, W>(app: &App<S>, input: R, mut output: W) -> std::io::Result<()>
where
  S: ListStore,
  R: AsyncBufRead + Unpin,
  W: AsyncWrite + Unpin,
{
  let mut session = Session::new();
  let mut lines = input.lines();

  while let Some(line) = lines.next_line().await? {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let text = match Line::try_parse_from(line.split_whitespace()) {
      Ok(Line { command }) => match execute(app, &mut session, command).await {
        Ok(Reply::Quit) => break,
        Ok(Reply::Text(text)) => text,
        Err(err) => format!("error: {err}"),
      },
      Err(err) => err.render().to_string(),
    };

    output.write_all(text.trim_end().as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
  }

  Ok(())
}
