// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

const PERIODS: [&str; 4] = ["daily", "weekly", "monthly", "yearly"];

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .value_name("YYYY-MM-DD")
            .help("Start date (inclusive)"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .value_name("YYYY-MM-DD")
            .help("End date (inclusive)"),
    )
}

fn full_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("full")
            .long("full")
            .action(ArgAction::SetTrue)
            .help("Show whole amounts instead of k/m/b shorthand"),
    )
}

fn label_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("category").long("category").short('c'))
        .arg(Arg::new("source").long("source").short('s'))
        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
        .arg(
            Arg::new("currency")
                .long("currency")
                .help("Currency code; overrides any symbol or code in the amount"),
        )
        .arg(
            Arg::new("tags")
                .long("tags")
                .value_name("A,B,...")
                .help("Comma-separated tags"),
        )
        .arg(Arg::new("notes").long("notes"))
        .arg(
            Arg::new("recurring")
                .long("recurring")
                .value_parser(PERIODS)
                .help("Make this a recurring template"),
        )
}

fn tx_command() -> Command {
    Command::new("tx")
        .about("Record and inspect transactions")
        .subcommand_required(true)
        .subcommand(label_args(
            Command::new("add")
                .about("Add a transaction")
                .arg(
                    Arg::new("amount")
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("Amount such as 30k, 1.5m, $100, 100USD or -250"),
                )
                .arg(Arg::new("description").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .value_parser(["income", "expense"])
                        .help("Force the sign: income is positive, expense negative"),
                ),
        ))
        .subcommand(json_args(full_arg(range_args(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .short('n')
                        .value_parser(value_parser!(usize))
                        .help("Maximum rows (defaults to list_limit from the config)"),
                )
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Case-insensitive match on description, category or source"),
                ),
        ))))
        .subcommand(json_args(
            Command::new("show")
                .about("Show one transaction")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        ))
        .subcommand(label_args(
            Command::new("update")
                .about("Change fields of a transaction")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .allow_hyphen_values(true),
                )
                .arg(Arg::new("description").long("description").short('d'))
                .arg(
                    Arg::new("no-recurring")
                        .long("no-recurring")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("recurring")
                        .help("Stop a recurring template; it stays as a plain transaction"),
                ),
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a transaction")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        )
        .subcommand(
            Command::new("post-recurring")
                .about("Post every due occurrence of recurring templates")
                .arg(
                    Arg::new("as-of")
                        .long("as-of")
                        .value_name("YYYY-MM-DD")
                        .help("Post occurrences due on or before this date (default today)"),
                ),
        )
}

fn summary_command() -> Command {
    Command::new("summary")
        .about("Totals by category, source or month")
        .subcommand_required(true)
        .subcommand(json_args(full_arg(range_args(
            Command::new("category").about("Totals per category, in each row's own currency"),
        ))))
        .subcommand(json_args(full_arg(range_args(
            Command::new("source").about("Totals per source, in each row's own currency"),
        ))))
        .subcommand(json_args(full_arg(
            Command::new("month").about("Income and expenses for one month").arg(
                Arg::new("month")
                    .long("month")
                    .value_name("YYYY-MM")
                    .help("Defaults to the current month"),
            ),
        )))
}

fn currency_command() -> Command {
    Command::new("currency")
        .about("Known currencies and exchange rates")
        .subcommand_required(true)
        .subcommand(json_args(Command::new("list").about("List known currencies")))
        .subcommand(
            Command::new("set")
                .about("Add or replace a currency rate")
                .arg(Arg::new("code").required(true))
                .arg(
                    Arg::new("rate")
                        .required(true)
                        .help("Units of this currency per one reference unit"),
                )
                .arg(Arg::new("name").long("name")),
        )
        .subcommand(full_arg(
            Command::new("convert")
                .about("Convert an amount between two known currencies")
                .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                .arg(Arg::new("from").required(true))
                .arg(Arg::new("to").required(true)),
        ))
        .subcommand(
            Command::new("fetch")
                .about("Refresh rates from open.er-api.com")
                .arg(
                    Arg::new("base")
                        .long("base")
                        .help("Reference currency for the fetched rates (default: configured currency)"),
                ),
        )
}

fn budget_command() -> Command {
    Command::new("budget")
        .about("Budget thresholds per category")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a budget")
                .arg(Arg::new("category").required(true))
                .arg(Arg::new("amount").required(true))
                .arg(
                    Arg::new("period")
                        .long("period")
                        .value_parser(PERIODS)
                        .default_value("monthly"),
                )
                .arg(Arg::new("start").long("start").value_name("YYYY-MM-DD"))
                .arg(Arg::new("end").long("end").value_name("YYYY-MM-DD")),
        )
        .subcommand(json_args(Command::new("list").about("List budgets")))
        .subcommand(json_args(
            Command::new("check")
                .about("Compare this month's spending against budgets")
                .arg(
                    Arg::new("record")
                        .long("record")
                        .action(ArgAction::SetTrue)
                        .help("Store each triggered alert"),
                ),
        ))
}

fn alerts_command() -> Command {
    Command::new("alerts")
        .about("Stored alerts")
        .subcommand_required(true)
        .subcommand(json_args(Command::new("list").about("List unread alerts")))
        .subcommand(
            Command::new("read")
                .about("Mark an alert as read")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        )
}

pub fn build_cli() -> Command {
    Command::new("finitor")
        .about("Multi-currency personal finance ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Config file (default: $FINITOR_CONFIG or the platform config dir)"),
        )
        .subcommand(Command::new("init").about("Create the database and a default config"))
        .subcommand(tx_command())
        .subcommand(json_args(full_arg(
            Command::new("balance")
                .about("Balance of all transactions in one currency")
                .arg(Arg::new("currency").long("currency")),
        )))
        .subcommand(summary_command())
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(range_args(
                    Command::new("transactions")
                        .about("Export transactions to a file")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .short('f')
                                .default_value("json")
                                .help("json or csv"),
                        )
                        .arg(Arg::new("out").long("out").short('o').required(true)),
                )),
        )
        .subcommand(currency_command())
        .subcommand(budget_command())
        .subcommand(alerts_command())
}
