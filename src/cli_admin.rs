use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli_style;

use artist_manager_server::store::{
    Gender, Mutation, NewUser, SqliteStore, StoreError, User, UserFields, UserRepository,
};
use artist_manager_server::user::auth::{hash_password, verify_password};
use artist_manager_server::user::{Role, ALL_ROLES};
use cli_style::{get_styles, print_error, print_key_value, print_success, print_warning};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_role(s: &str) -> Result<Role> {
    Role::from_str(s).ok_or_else(|| {
        let valid: Vec<_> = ALL_ROLES.iter().map(|r| r.as_str()).collect();
        anyhow!("Invalid role '{}'. Valid roles are: {}", s, valid.join(", "))
    })
}

fn parse_gender(s: &str) -> Result<Gender> {
    Gender::parse_lenient(s).ok_or_else(|| anyhow!("Invalid gender '{}'. Use m, f or o", s))
}

#[derive(Parser)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the SQLite database file.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates a user the way an administrator does: a super_admin also gets
    /// the staff flags.
    AddUser {
        email: String,
        password: String,
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: Option<String>,
        #[clap(long, value_parser = parse_role, default_value = "super_admin")]
        role: Role,
        #[clap(long, value_parser = parse_gender, default_value = "o")]
        gender: Gender,
    },

    /// Replaces the password of a user.
    SetPassword { email: String, password: String },

    /// Changes the role of a user. Staff flags are left as they are.
    SetRole {
        email: String,
        #[clap(value_parser = parse_role)]
        role: Role,
    },

    /// Shows every user.
    ListUsers,

    /// Verifies the password of a given user, it doesn't make any
    /// persistent change, nor it creates any session, it just
    /// compares the password hash.
    CheckPassword { email: String, password: String },

    /// Deletes a user together with their sessions.
    DeleteUser { email: String },

    /// Shows the path of the database.
    Where,
}

fn find_user(store: &SqliteStore, email: &str) -> Result<User> {
    store
        .get_user_by_email(email)?
        .ok_or_else(|| anyhow!("User {} not found.", email))
}

fn expect_applied(mutation: Mutation, email: &str) -> Result<()> {
    match mutation {
        Mutation::Applied => Ok(()),
        Mutation::NotFound => bail!("User {} disappeared while updating it.", email),
    }
}

fn execute(store: &SqliteStore, command: Command, db_path: &str) -> Result<()> {
    match command {
        Command::AddUser {
            email,
            password,
            first_name,
            last_name,
            role,
            gender,
        } => {
            let fields = UserFields {
                first_name,
                last_name,
                email: email.clone(),
                phone: None,
                dob: None,
                gender,
                address: None,
                role,
            };
            let new_user = NewUser::by_admin(fields, hash_password(&password)?);
            match store.create_user(&new_user) {
                Ok(id) => print_success(&format!("Created user {} with id {}", email, id)),
                Err(StoreError::Duplicate(_)) => bail!("A user with email {} already exists.", email),
                Err(err) => return Err(err.into()),
            }
        }
        Command::SetPassword { email, password } => {
            let user = find_user(store, &email)?;
            let hash = hash_password(&password)?;
            expect_applied(store.set_user_password_hash(user.id, &hash)?, &email)?;
            print_success(&format!("Password of {} updated", email));
        }
        Command::SetRole { email, role } => {
            let user = find_user(store, &email)?;
            expect_applied(store.set_user_role(user.id, role)?, &email)?;
            print_success(&format!("Role of {} set to {}", email, role.as_str()));
            if user.is_staff && role != Role::SuperAdmin {
                print_warning("The user keeps the staff flags of the previous role");
            }
        }
        Command::ListUsers => {
            let total = store.count_users()?;
            let users = store.list_users(total, 0)?;
            if users.is_empty() {
                print_warning("No users yet, create one with add-user");
                return Ok(());
            }
            let mut table = cli_style::TableBuilder::new(&["id", "email", "name", "role", "staff"]);
            for user in users {
                let name = match &user.last_name {
                    Some(last_name) => format!("{} {}", user.first_name, last_name),
                    None => user.first_name.clone(),
                };
                table.add_row(vec![
                    user.id.to_string(),
                    user.email,
                    name,
                    user.role_type,
                    user.is_staff.to_string(),
                ]);
            }
            table.print();
        }
        Command::CheckPassword { email, password } => {
            let user = find_user(store, &email)?;
            match verify_password(&password, &user.password_hash) {
                Ok(true) => print_success("The password provided is correct!"),
                Ok(false) => print_error("Wrong password."),
                Err(err) => bail!(
                    "Could not verify the password, something went wrong: {}",
                    err
                ),
            }
        }
        Command::DeleteUser { email } => {
            let user = find_user(store, &email)?;
            expect_applied(store.delete_user(user.id)?, &email)?;
            print_success(&format!("Deleted user {}", email));
        }
        Command::Where => {
            print_key_value("Database", db_path);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let db_path = cli_args.db_path.to_string_lossy().to_string();
    let store = SqliteStore::new(&cli_args.db_path)
        .with_context(|| format!("Failed to open database {}", db_path))?;

    if let Err(err) = execute(&store, cli_args.command, &db_path) {
        print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
