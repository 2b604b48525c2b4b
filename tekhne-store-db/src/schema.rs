// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database schema definitions for the maintenance log.

/// Core schema SQL (workshops, users, components, steps).
///
/// Tables are created parent-before-child so the foreign keys resolve.
/// Steps carry the `(component_id, step_number)` uniqueness constraint;
/// there is no report table, a report is derived from the steps.
pub const SCHEMA_SQL: &str = r#"
create table if not exists workshops (
    id   integer primary key autoincrement not null,
    name text unique not null
);

create table if not exists users (
    id            integer primary key autoincrement not null,
    username      text unique not null,
    password_hash text not null,
    display_name  text not null,
    role          text not null default 'Technician',
    is_active     integer not null default 1,
    workshop_id   integer,
    foreign key (workshop_id) references workshops(id) on delete set null
);

create table if not exists components (
    id             integer primary key autoincrement not null,
    name           text not null,
    inventory_code text unique not null,
    workshop_id    integer not null,
    foreign key (workshop_id) references workshops(id) on delete cascade
);

create table if not exists steps (
    id           integer primary key autoincrement not null,
    component_id integer not null,
    user_id      integer not null,
    action_type  text not null,
    step_number  integer not null,
    description  text,
    photo_ref    text not null,
    logged_at    text not null default current_timestamp,
    unique (component_id, step_number),
    foreign key (component_id) references components(id) on delete cascade,
    foreign key (user_id) references users(id) on delete cascade
);

create index if not exists IndexStepsGroup on steps(component_id, action_type);
create index if not exists IndexStepsUser on steps(user_id);
"#;

/// Seed rows inserted on first initialization: the three workshops and the
/// two demo accounts (password "123456", stored as its MD5 digest).
pub const SEED_SQL: &str = r#"
insert into workshops (name) values ('Electromechanical');
insert into workshops (name) values ('Electrical');
insert into workshops (name) values ('Hydraulic');

insert into users (username, password_hash, display_name, role, workshop_id)
    values ('admin', 'e10adc3949ba59abbe56e057f20f883e', 'General Administrator', 'Admin', null);
insert into users (username, password_hash, display_name, role, workshop_id)
    values ('tech', 'e10adc3949ba59abbe56e057f20f883e', 'Juan Perez', 'Technician', 1);
"#;

/// Destructive upgrade path: drop everything, child tables first.
pub const DROP_SQL: &str = r#"
drop table if exists steps;
drop table if exists components;
drop table if exists users;
drop table if exists workshops;
"#;

/// Schema version, stored in `PRAGMA user_version`. Any mismatch on a
/// writable open rebuilds the database from scratch; there is no
/// row-preserving migration.
pub const SCHEMA_VERSION: i32 = 1;
