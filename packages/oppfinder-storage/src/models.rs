use time::OffsetDateTime;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Department {
	pub department_id: i64,
	pub org_unit: String,
	pub department_name: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Author {
	pub author_id: i64,
	pub name: String,
	/// University-wide person identifier. Also the author key carried by indexed projects.
	pub uco: String,
	pub r#type: Option<String>,
}

/// A project row joined with its author's `uco` and its department.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Project {
	pub project_id: i64,
	pub proj_id: Option<String>,
	pub reg_code: Option<String>,
	pub title: String,
	pub author_id: Option<i64>,
	pub author_uco: Option<String>,
	pub state: Option<String>,
	pub date_begin: Option<OffsetDateTime>,
	pub date_end: Option<OffsetDateTime>,
	pub muni_role: Option<String>,
	pub investor: Option<String>,
	pub department_id: Option<i64>,
	pub department_name: Option<String>,
	pub annotation: Option<String>,
	pub processed_annotation: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NewProject {
	pub proj_id: Option<String>,
	pub reg_code: Option<String>,
	pub title: String,
	pub author_id: Option<i64>,
	pub state: Option<String>,
	pub date_begin: Option<OffsetDateTime>,
	pub date_end: Option<OffsetDateTime>,
	pub muni_role: Option<String>,
	pub investor: Option<String>,
	pub department_id: Option<i64>,
	pub annotation: Option<String>,
	pub processed_annotation: Option<String>,
}
