use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use predicates::prelude::*;
use std::time::Duration;

mod migrate_tests {
    use super::*;

    fn project_with_three_units(marker: i64) -> Result<CliTestHelper> {
        let helper = CliTestHelper::new();
        helper.init_project(marker)?;
        helper.add_unit("100-a.sql")?;
        helper.add_unit("200-b.sql")?;
        helper.add_unit("300-c.sql")?;
        Ok(helper)
    }

    #[test]
    fn test_missing_config_fails() {
        let helper = CliTestHelper::new();

        helper
            .command()
            .arg("up")
            .assert()
            .failure()
            .stderr(predicate::str::contains("stepmigrate init"));
    }

    #[test]
    fn test_up_with_no_units_succeeds() -> Result<()> {
        let helper = CliTestHelper::new();
        helper.init_project(0)?;

        helper
            .command()
            .args(["up", "all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No pending migrations"));

        assert_eq!(helper.read_config()?["current_timestamp"]["default"], 0);
        Ok(())
    }

    #[test]
    fn test_no_subcommand_runs_up() -> Result<()> {
        let helper = project_with_three_units(300)?;

        helper
            .command()
            .assert()
            .success()
            .stdout(predicate::str::contains("No pending migrations"));
        Ok(())
    }

    #[test]
    fn test_down_with_nothing_applied() -> Result<()> {
        let helper = project_with_three_units(0)?;

        helper
            .command()
            .arg("down")
            .assert()
            .success()
            .stdout(predicate::str::contains("No applied migrations to revert"));
        Ok(())
    }

    #[test]
    fn test_zero_count_is_a_no_op() -> Result<()> {
        let helper = project_with_three_units(0)?;

        helper
            .command()
            .args(["up", "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No pending migrations"));
        Ok(())
    }

    #[test]
    fn test_malformed_unit_name_fails() -> Result<()> {
        let helper = project_with_three_units(0)?;
        helper.add_unit("notes.sql")?;

        helper
            .command()
            .arg("up")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Cannot parse an ordering key from migration name 'notes.sql'",
            ));
        Ok(())
    }

    #[test]
    fn test_dry_run_down_lists_newest_first() -> Result<()> {
        let helper = project_with_three_units(300)?;

        helper
            .command()
            .args(["down", "2", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would run down on 'default' from marker 300"))
            .stdout(predicate::str::is_match(r"300-c\.sql\s+200-b\.sql")?)
            .stdout(predicate::str::contains("100-a.sql").not());

        assert_eq!(helper.read_config()?["current_timestamp"]["default"], 300);
        Ok(())
    }

    #[test]
    fn test_dry_run_up_respects_marker() -> Result<()> {
        let helper = project_with_three_units(100)?;

        helper
            .command()
            .args(["up", "all", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"200-b\.sql\s+300-c\.sql")?)
            .stdout(predicate::str::contains("100-a.sql").not());
        Ok(())
    }

    #[test]
    fn test_unknown_environment_fails() -> Result<()> {
        let helper = project_with_three_units(0)?;

        helper
            .command()
            .args(["up", "-e", "production"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Environment 'production' has no connection configured",
            ));
        Ok(())
    }

    #[test]
    fn test_invalid_count_is_rejected() -> Result<()> {
        let helper = project_with_three_units(0)?;

        helper.command().args(["up", "several"]).assert().failure();
        Ok(())
    }

    #[test]
    fn test_failed_unit_leaves_marker() -> Result<()> {
        let helper = project_with_three_units(100)?;

        // The configured database is unreachable, so the first unit fails
        helper
            .command()
            .args(["up", "all"])
            .timeout(Duration::from_secs(60))
            .assert()
            .failure()
            .stdout(predicate::str::contains("Applying migration 200-b.sql - up"))
            .stderr(predicate::str::contains("200-b.sql"));

        assert_eq!(helper.read_config()?["current_timestamp"]["default"], 100);
        Ok(())
    }
}
