use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jamaat",
    version,
    author,
    about = "Live congregation board for your masjid: prayer times, announcements and events"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's congregation times and the next prayer
    Times,
    /// List published announcements, or show one
    News {
        /// Include unpublished drafts
        #[arg(long)]
        all: bool,
        /// Show a single announcement
        #[arg(long)]
        id: Option<String>,
    },
    /// List upcoming events, or show one
    Events {
        /// Include unpublished drafts
        #[arg(long)]
        all: bool,
        /// Show a single event
        #[arg(long)]
        id: Option<String>,
    },
    /// List contact channels with mail links
    Contacts,
    /// Manage the board's content
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Change one prayer's times, visibility or note
    Prayer {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha, jummah)
        name: String,
        /// Adhan time, HH:MM
        #[arg(long, conflicts_with = "clear_adhan")]
        adhan: Option<String>,
        /// Remove the adhan time
        #[arg(long)]
        clear_adhan: bool,
        /// Iqama time, HH:MM
        #[arg(long)]
        iqama: Option<String>,
        /// Show or hide the slot on the board
        #[arg(long)]
        active: Option<bool>,
        /// Short note shown under the time
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },
    /// Announcements
    News {
        #[command(subcommand)]
        action: NewsCommands,
    },
    /// Events
    Event {
        #[command(subcommand)]
        action: EventCommands,
    },
    /// Contact directory
    Contact {
        #[command(subcommand)]
        action: ContactCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct NewsFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    /// Image link (http or https)
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NewsCommands {
    /// Create a draft announcement
    Create {
        #[command(flatten)]
        fields: NewsFields,
    },
    /// Edit an announcement; unset fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: NewsFields,
    },
    Publish {
        id: String,
    },
    Unpublish {
        id: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct EventFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,
    /// Start time, HH:MM (local)
    #[arg(long)]
    pub start_time: Option<String>,
    /// End date, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,
    /// End time, HH:MM (local)
    #[arg(long)]
    pub end_time: Option<String>,
    /// Number of places; empty for unlimited
    #[arg(long)]
    pub capacity: Option<String>,
    /// Image link (http or https)
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// Create a draft event
    Create {
        #[command(flatten)]
        fields: EventFields,
    },
    /// Edit an event; unset fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Publish {
        id: String,
    },
    Unpublish {
        id: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// Add a contact channel
    Add {
        name: String,
        /// Address inquiries are sent to
        #[arg(long)]
        email: String,
        #[arg(long)]
        description: Option<String>,
        /// Position in the list; appended when omitted
        #[arg(long)]
        order: Option<i64>,
    },
    /// Remove a contact channel
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
