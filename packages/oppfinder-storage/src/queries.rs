use crate::{
	Result,
	db::Db,
	models::{Author, NewProject, Project},
};

const PROJECT_SELECT: &str = "\
SELECT
	p.project_id,
	p.proj_id,
	p.reg_code,
	p.title,
	p.author_id,
	a.uco AS author_uco,
	p.state,
	p.date_begin,
	p.date_end,
	p.muni_role,
	p.investor,
	p.department_id,
	d.department_name,
	p.annotation,
	p.processed_annotation
FROM projects p
LEFT JOIN authors a ON a.author_id = p.author_id
LEFT JOIN departments d ON d.department_id = p.department_id";

pub async fn insert_department(db: &Db, org_unit: &str, department_name: &str) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO departments (org_unit, department_name)
VALUES ($1, $2)
RETURNING department_id",
	)
	.bind(org_unit)
	.bind(department_name)
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

pub async fn insert_author(db: &Db, name: &str, uco: &str, r#type: Option<&str>) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO authors (name, uco, type)
VALUES ($1, $2, $3)
RETURNING author_id",
	)
	.bind(name)
	.bind(uco)
	.bind(r#type)
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

pub async fn insert_project(db: &Db, project: &NewProject) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO projects (
	proj_id,
	reg_code,
	title,
	author_id,
	state,
	date_begin,
	date_end,
	muni_role,
	investor,
	department_id,
	annotation,
	processed_annotation
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
RETURNING project_id",
	)
	.bind(project.proj_id.as_deref())
	.bind(project.reg_code.as_deref())
	.bind(project.title.as_str())
	.bind(project.author_id)
	.bind(project.state.as_deref())
	.bind(project.date_begin)
	.bind(project.date_end)
	.bind(project.muni_role.as_deref())
	.bind(project.investor.as_deref())
	.bind(project.department_id)
	.bind(project.annotation.as_deref())
	.bind(project.processed_annotation.as_deref())
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

pub async fn project_by_id(db: &Db, project_id: i64) -> Result<Option<Project>> {
	let sql = format!("{PROJECT_SELECT}\nWHERE p.project_id = $1");
	let project = sqlx::query_as::<_, Project>(&sql).bind(project_id).fetch_optional(&db.pool).await?;

	Ok(project)
}

/// Rows come back in ascending id order; ids with no row are simply absent.
pub async fn projects_by_ids(db: &Db, project_ids: &[i64]) -> Result<Vec<Project>> {
	if project_ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("{PROJECT_SELECT}\nWHERE p.project_id = ANY($1)\nORDER BY p.project_id");
	let projects = sqlx::query_as::<_, Project>(&sql).bind(project_ids).fetch_all(&db.pool).await?;

	Ok(projects)
}

pub async fn projects_by_author_uco(db: &Db, uco: &str) -> Result<Vec<Project>> {
	let sql = format!("{PROJECT_SELECT}\nWHERE a.uco = $1\nORDER BY p.project_id");
	let projects = sqlx::query_as::<_, Project>(&sql).bind(uco).fetch_all(&db.pool).await?;

	Ok(projects)
}

/// Business ids are not unique in the source data; the oldest row wins.
pub async fn project_by_proj_id(db: &Db, proj_id: &str) -> Result<Option<Project>> {
	let sql = format!("{PROJECT_SELECT}\nWHERE p.proj_id = $1\nORDER BY p.project_id\nLIMIT 1");
	let project = sqlx::query_as::<_, Project>(&sql).bind(proj_id).fetch_optional(&db.pool).await?;

	Ok(project)
}

pub async fn author_by_uco(db: &Db, uco: &str) -> Result<Option<Author>> {
	let author = sqlx::query_as::<_, Author>(
		"\
SELECT author_id, name, uco, type
FROM authors
WHERE uco = $1",
	)
	.bind(uco)
	.fetch_optional(&db.pool)
	.await?;

	Ok(author)
}
